//! NTES fetch error types.

/// Errors that can occur while fetching a running-status page.
#[derive(Debug, thiserror::Error)]
pub enum NtesError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CSRF token endpoint answered without a token
    #[error("CSRF token not found in upstream response")]
    TokenNotFound,

    /// Upstream answered with an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Fixture file could not be read
    #[error("fixture error: {0}")]
    Fixture(#[source] std::io::Error),

    /// Client could not be built from its configuration
    #[error("invalid client configuration: {message}")]
    InvalidConfig { message: String },
}

impl NtesError {
    /// Build an API error from a status and a response body, keeping only an excerpt.
    pub(crate) fn api(status: u16, body: &str) -> Self {
        NtesError::Api {
            status,
            message: body.chars().take(200).collect(),
        }
    }
}
