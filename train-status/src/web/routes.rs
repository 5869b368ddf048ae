//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Local;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::service::{StatusError, train_status};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/train/:train_number", get(get_train))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Welcome message.
async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Train Track API",
    })
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Running status of a train, optionally limited to a time window.
async fn get_train(
    State(state): State<AppState>,
    Path(train_number): Path<String>,
    headers: HeaderMap,
    Query(params): Query<StatusParams>,
) -> Result<Response, AppError> {
    let now = Local::now();

    let status = train_status(
        state.upstream.as_ref(),
        &train_number,
        params.start_time.as_deref(),
        params.end_time.as_deref(),
        &now,
    )
    .await?;

    if accepts_html(&headers) {
        let template = StatusTemplate::from_status(&status);
        let html = template.render().map_err(|e| AppError::Internal {
            message: format!("Template error: {e}"),
        })?;
        Ok(Html(html).into_response())
    } else {
        Ok(Json(TrainStatusResponse::from_status(&status)).into_response())
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Malformed client input
    Unprocessable { message: String },
    /// Upstream site failed
    BadGateway { message: String },
    Internal { message: String },
}

impl From<StatusError> for AppError {
    fn from(e: StatusError) -> Self {
        match e {
            StatusError::InvalidTrainNumber(_) | StatusError::InvalidWindow(_) => {
                AppError::Unprocessable {
                    message: e.to_string(),
                }
            }
            StatusError::Upstream(_) => AppError::BadGateway {
                message: e.to_string(),
            },
            StatusError::Worker(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unprocessable { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::ntes::{FixtureFetcher, Upstream};

    const PAGE: &str = "<div>Start Date : 01-Jan-2026</div>\n\
        <div>Departed from Howrah Jn (HWH) at 16:50</div>\n\
        <div>Last Updates On 01-Jan-2026 17:00</div>";

    fn app(dir: &std::path::Path) -> Router {
        create_router(AppState::new(Upstream::Fixture(FixtureFetcher::new(dir))))
    }

    async fn get(router: Router, uri: &str, accept: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::ACCEPT, accept)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("12301.html"), PAGE).unwrap();
        dir
    }

    #[test]
    fn accepts_html_detection() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_html(&headers));

        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(!accepts_html(&headers));

        headers.insert(
            header::ACCEPT,
            "text/html,application/xhtml+xml".parse().unwrap(),
        );
        assert!(accepts_html(&headers));
    }

    #[tokio::test]
    async fn welcome_message() {
        let dir = fixture_dir();
        let (status, body) = get(app(dir.path()), "/", "application/json").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["message"], "Welcome to the Train Track API");
    }

    #[tokio::test]
    async fn health_check() {
        let dir = fixture_dir();
        let (status, body) = get(app(dir.path()), "/health", "*/*").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn train_status_json() {
        let dir = fixture_dir();
        let (status, body) = get(
            app(dir.path()),
            "/train/12301?start_time=2026-01-01T00:00:00&end_time=2026-01-02T00:00:00",
            "application/json",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["train_number"], "12301");
        assert_eq!(value["start_date"], "01-Jan-2026");
        assert_eq!(value["last_update"], "01-Jan-2026 17:00");
        assert_eq!(value["events"].as_array().unwrap().len(), 1);
        assert_eq!(value["events"][0]["type"], "Departed");
        assert_eq!(value["events"][0]["code"], "HWH");
        assert_eq!(value["events"][0]["station"], "Howrah Jn");
        assert_eq!(value["events"][0]["datetime"], "2026-01-01T16:50:00");
        assert!(value["events"][0]["delay"].is_null());
    }

    #[tokio::test]
    async fn train_status_html() {
        let dir = fixture_dir();
        let (status, body) = get(
            app(dir.path()),
            "/train/12301?start_time=2026-01-01T00:00:00&end_time=2026-01-02T00:00:00",
            "text/html",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Howrah Jn (HWH)"));
        assert!(body.contains("01 Jan 16:50"));
    }

    #[tokio::test]
    async fn invalid_train_number_is_unprocessable() {
        let dir = fixture_dir();
        let (status, body) = get(app(dir.path()), "/train/123", "application/json").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("invalid train number"));
    }

    #[tokio::test]
    async fn invalid_window_is_unprocessable() {
        let dir = fixture_dir();
        let (status, body) = get(
            app(dir.path()),
            "/train/12301?end_time=tomorrow",
            "application/json",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value["error"].as_str().unwrap().contains("end_time"));
    }

    #[tokio::test]
    async fn missing_upstream_page_is_bad_gateway() {
        let dir = fixture_dir();
        let (status, body) = get(app(dir.path()), "/train/22691", "application/json").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("upstream unavailable"));
    }

    #[test]
    fn status_errors_map_to_codes() {
        let err: AppError = StatusError::Upstream(crate::ntes::NtesError::TokenNotFound).into();
        assert!(matches!(err, AppError::BadGateway { .. }));

        let window_err = crate::status::resolve_window(Some("x"), None, &Local::now()).unwrap_err();
        let err: AppError = StatusError::InvalidWindow(window_err).into();
        assert!(matches!(err, AppError::Unprocessable { .. }));
    }
}
