//! Error types for nodepulse-dashboard

/// Result type alias for API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors returned by the performance API client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Server answered with a non-2xx status
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Request never produced a response (unreachable host, CORS, aborted)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<gloo_net::Error> for ApiError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(e) => ApiError::Decode(e.to_string()),
            other => ApiError::Network(other.to_string()),
        }
    }
}

/// Errors raised while applying an injected configuration value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown setting: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
