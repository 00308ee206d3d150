//! Language model providers for Folio.
//!
//! This crate provides:
//! - The [`Provider`] trait for chat completion backends
//! - An OpenAI-compatible implementation (Hugging Face router by default)
//! - [`Generator`], which applies fixed sampling settings and a timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_providers::{GenerationSettings, Generator, OpenAIProvider};
//! use std::sync::Arc;
//!
//! let provider = OpenAIProvider::new(None);
//! let generator = Generator::new(Arc::new(provider), GenerationSettings::default());
//! let answer = generator.generate("Tell me about your projects.").await;
//! ```

mod error;
mod types;

pub mod generator;
pub mod openai;

pub use error::{ProviderError, Result};
pub use generator::{GenerationSettings, Generator, CONNECTION_FALLBACK};
pub use openai::OpenAIProvider;
pub use types::*;

use async_trait::async_trait;

/// A model provider that can generate completions.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get provider name.
    fn name(&self) -> &str;

    /// Generate a chat completion.
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatResponse>;
}
