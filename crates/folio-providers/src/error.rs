//! Failures talking to the text-generation service.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The token was rejected.
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {message}. Retry after {retry_after:?} seconds")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Unknown model, oversized prompt and similar.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other non-success status, including a model that is still loading.
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service answered 200 with nothing usable.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<u64>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Authentication(message),
            429 => Self::RateLimit {
                message,
                retry_after,
            },
            400 | 404 | 422 => Self::InvalidRequest(message),
            _ => Self::server_error(status, message),
        }
    }

    /// Whether the same request could succeed later. Only used for logging;
    /// a failed answer is never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let cases = [
            (401, "Authentication"),
            (403, "Authentication"),
            (429, "RateLimit"),
            (422, "InvalidRequest"),
            (503, "ServerError"),
        ];
        for (status, expected) in cases {
            let err = ProviderError::from_status(status, "x", Some(30));
            let kind = match err {
                ProviderError::Authentication(_) => "Authentication",
                ProviderError::RateLimit { .. } => "RateLimit",
                ProviderError::InvalidRequest(_) => "InvalidRequest",
                ProviderError::ServerError { .. } => "ServerError",
                _ => "other",
            };
            assert_eq!(kind, expected, "status {}", status);
        }
    }

    #[test]
    fn test_loading_model_is_retryable() {
        assert!(ProviderError::server_error(503, "loading").is_retryable());
        assert!(ProviderError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!ProviderError::from_status(401, "", None).is_retryable());
        assert!(!ProviderError::server_error(400, "").is_retryable());
    }
}
