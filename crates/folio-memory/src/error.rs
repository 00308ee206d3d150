//! Memory error types.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during ingestion, embedding, or retrieval.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A corpus file could not be read.
    #[error("Failed to ingest {path}: {reason}")]
    Ingestion { path: PathBuf, reason: String },

    /// The embedding backend refused or failed the request.
    #[error("Embedding service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The embedding backend did not answer in time.
    #[error("Embedding request timed out after {0:?}")]
    Timeout(Duration),

    /// The embedding backend answered with something unusable.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MemoryError {
    /// Create an ingestion error.
    pub fn ingestion(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Ingestion {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from talking to the embedding service.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::Timeout(_) | Self::Http(_) | Self::Embedding(_)
        )
    }
}
