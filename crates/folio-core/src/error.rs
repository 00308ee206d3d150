//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// `$HOME` could not be resolved, so there is no default location.
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("JSON5 parse error: {0}")]
    Json5(String),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Every invalid value, joined with `; `.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
