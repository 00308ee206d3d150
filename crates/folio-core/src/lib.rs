//! # folio-core
//!
//! Core configuration and utilities for Folio.
//!
//! This crate provides shared functionality used across all Folio crates:
//!
//! - **Configuration**: Loading, validation, and environment overrides
//! - **Environment**: `.env` loading and typed variable access
//! - **Secrets**: Redacted, zeroize-on-drop credential strings

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Result};
pub use secret::SecretString;
