use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The device rejected the request. `code` is the FortiOS error number
    /// (e.g. -5 for a duplicate entry), `cli_error` the CLI parser output.
    #[error("API returned error (HTTP {status}, error {code:?}): {message}")]
    Device {
        status: u16,
        code: Option<i64>,
        cli_error: Option<String>,
        message: String,
    },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,
}

impl ApiError {
    /// Transient failures worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout(_) | ApiError::RateLimited | ApiError::ServiceUnavailable
        )
    }
}
