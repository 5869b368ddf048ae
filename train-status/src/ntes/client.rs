//! NTES running-status HTTP client.
//!
//! The mobile NTES site hands out the running-status fragment only to a
//! browser-like session: cookies from the landing page, then a CSRF token,
//! then a form POST carrying that token.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::status::TrainNumber;

use super::error::NtesError;

/// Default base URL for the NTES mobile site.
pub const DEFAULT_BASE_URL: &str = "https://enquiry.indianrail.gov.in/mntes";

/// Default maximum concurrent upstream fetches.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/143.0.0.0 Safari/537.36 Edg/143.0.0.0";

static CSRF_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"name='([^']+)' value='([^']+)'").expect("valid regex"));

/// Configuration for the NTES client.
#[derive(Debug, Clone)]
pub struct NtesConfig {
    /// Base URL of the site (defaults to production NTES)
    pub base_url: String,
    /// Maximum concurrent fetches
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NtesConfig {
    /// Create a config pointing at production NTES.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent fetches.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NtesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// NTES running-status client.
///
/// Every fetch runs in its own cookie session. A semaphore caps how many
/// fetches are in flight at once.
#[derive(Debug, Clone)]
pub struct NtesClient {
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    semaphore: Arc<Semaphore>,
}

impl NtesClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NtesConfig) -> Result<Self, NtesError> {
        if config.max_concurrent == 0 {
            return Err(NtesError::InvalidConfig {
                message: "max_concurrent must be at least 1".to_string(),
            });
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let headers = default_headers(&base_url)?;

        Ok(Self {
            base_url,
            headers,
            timeout: Duration::from_secs(config.timeout_secs),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the running-status HTML for a train on a journey date.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_status_html(
        &self,
        train: TrainNumber,
        date: NaiveDate,
    ) -> Result<String, NtesError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| NtesError::InvalidConfig {
                message: "semaphore closed".to_string(),
            })?;

        let http = self.session()?;

        self.bootstrap(&http).await?;
        let (key, value) = self.csrf_token(&http).await?;
        debug!(token_field = %key, "obtained CSRF token");

        let ref_date = format_ref_date(date);
        let train_no = train.to_string();
        let url = format!("{}/tr", self.base_url);

        let response = http
            .post(&url)
            .query(&[
                ("opt", "TrainRunning"),
                ("subOpt", "FindRunningInstance"),
                ("refDate", ref_date.as_str()),
            ])
            .form(&[
                ("lan", "en"),
                ("jDate", ref_date.as_str()),
                ("trainNo", train_no.as_str()),
                (key.as_str(), value.as_str()),
            ])
            .send()
            .await?;

        let body = success_body(response).await?;
        debug!(bytes = body.len(), "fetched running status");
        Ok(body)
    }

    /// A fresh HTTP client with its own cookie jar.
    fn session(&self) -> Result<reqwest::Client, NtesError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(self.headers.clone())
            .timeout(self.timeout)
            .build()?;
        Ok(http)
    }

    /// Load the landing page so the session picks up its cookies.
    async fn bootstrap(&self, http: &reqwest::Client) -> Result<(), NtesError> {
        let url = format!("{}/", self.base_url);
        let response = http.get(&url).send().await?;
        success_body(response).await?;
        Ok(())
    }

    async fn csrf_token(&self, http: &reqwest::Client) -> Result<(String, String), NtesError> {
        let url = format!("{}/GetCSRFToken", self.base_url);
        let millis = Utc::now().timestamp_millis().to_string();

        let response = http.get(&url).query(&[("t", millis)]).send().await?;
        let body = success_body(response).await?;

        parse_csrf_token(&body).ok_or(NtesError::TokenNotFound)
    }
}

/// Read a response body, turning an error status into [`NtesError::Api`].
async fn success_body(response: reqwest::Response) -> Result<String, NtesError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NtesError::api(status.as_u16(), &body));
    }
    Ok(response.text().await?)
}

fn default_headers(base_url: &str) -> Result<HeaderMap, NtesError> {
    let invalid = |what: &str| NtesError::InvalidConfig {
        message: format!("invalid {what} derived from base URL {base_url:?}"),
    };

    let url = reqwest::Url::parse(base_url).map_err(|_| invalid("URL"))?;
    let origin = url.origin().ascii_serialization();
    let referer = format!("{base_url}/");

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::REFERER,
        HeaderValue::from_str(&referer).map_err(|_| invalid("Referer"))?,
    );
    headers.insert(
        header::ORIGIN,
        HeaderValue::from_str(&origin).map_err(|_| invalid("Origin"))?,
    );
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    Ok(headers)
}

/// Pull the `(field name, value)` pair out of the CSRF token response.
pub fn parse_csrf_token(body: &str) -> Option<(String, String)> {
    let caps = CSRF_TOKEN.captures(body)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Date in the `DD-Mon-YYYY` form NTES expects, e.g. `02-Jan-2026`.
pub fn format_ref_date(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header as has_header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_BODY: &str = "<input type='hidden' name='csrfKey1' value='abc123'/>";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
    }

    fn train() -> TrainNumber {
        TrainNumber::parse("12301").unwrap()
    }

    fn client_for(server: &MockServer) -> NtesClient {
        NtesClient::new(NtesConfig::new().with_base_url(server.uri()).with_timeout(5)).unwrap()
    }

    async fn mount_session(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "JSESSIONID=s1; Path=/")
                    .set_body_string("<html></html>"),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn config_defaults() {
        let config = NtesConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn config_builder() {
        let config = NtesConfig::new()
            .with_base_url("http://localhost:8080")
            .with_max_concurrent(2)
            .with_timeout(3);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let result = NtesClient::new(NtesConfig::new().with_max_concurrent(0));
        assert!(matches!(result, Err(NtesError::InvalidConfig { .. })));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let result = NtesClient::new(NtesConfig::new().with_base_url("not a url"));
        assert!(matches!(result, Err(NtesError::InvalidConfig { .. })));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            NtesClient::new(NtesConfig::new().with_base_url("http://localhost:8080/mntes/"))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/mntes");
    }

    #[test]
    fn headers_follow_base_url() {
        let headers = default_headers(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            headers[header::REFERER],
            "https://enquiry.indianrail.gov.in/mntes/"
        );
        assert_eq!(headers[header::ORIGIN], "https://enquiry.indianrail.gov.in");
        assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
        assert!(headers.get(header::ACCEPT_ENCODING).is_none());
    }

    #[test]
    fn csrf_token_is_parsed() {
        assert_eq!(
            parse_csrf_token(TOKEN_BODY),
            Some(("csrfKey1".to_string(), "abc123".to_string()))
        );
        assert_eq!(parse_csrf_token("<html>no token</html>"), None);
        assert_eq!(parse_csrf_token(r#"name="k" value="v""#), None);
    }

    #[test]
    fn ref_date_format() {
        assert_eq!(format_ref_date(date()), "02-Jan-2026");
        assert_eq!(
            format_ref_date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()),
            "31-Dec-2025"
        );
    }

    #[tokio::test]
    async fn fetch_runs_full_exchange() {
        let server = MockServer::start().await;
        mount_session(&server).await;

        Mock::given(method("GET"))
            .and(path("/GetCSRFToken"))
            .and(has_header("x-requested-with", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_BODY))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/tr"))
            .and(query_param("opt", "TrainRunning"))
            .and(query_param("subOpt", "FindRunningInstance"))
            .and(query_param("refDate", "02-Jan-2026"))
            .and(has_header("cookie", "JSESSIONID=s1"))
            .and(body_string_contains("trainNo=12301"))
            .and(body_string_contains("jDate=02-Jan-2026"))
            .and(body_string_contains("lan=en"))
            .and(body_string_contains("csrfKey1=abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<div>Departed from Howrah</div>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let html = client_for(&server)
            .fetch_status_html(train(), date())
            .await
            .unwrap();
        assert_eq!(html, "<div>Departed from Howrah</div>");
    }

    #[tokio::test]
    async fn missing_token_is_reported() {
        let server = MockServer::start().await;
        mount_session(&server).await;

        Mock::given(method("GET"))
            .and(path("/GetCSRFToken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/tr"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_status_html(train(), date())
            .await
            .unwrap_err();
        assert!(matches!(err, NtesError::TokenNotFound));
    }

    #[tokio::test]
    async fn bootstrap_failure_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_status_html(train(), date())
            .await
            .unwrap_err();
        match err {
            NtesError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn status_post_failure_is_api_error() {
        let server = MockServer::start().await;
        mount_session(&server).await;

        Mock::given(method("GET"))
            .and(path("/GetCSRFToken"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_BODY))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/tr"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_status_html(train(), date())
            .await
            .unwrap_err();
        assert!(matches!(err, NtesError::Api { status: 500, .. }));
    }
}
