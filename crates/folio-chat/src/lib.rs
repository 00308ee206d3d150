//! Retrieval-augmented conversation engine for Folio.
//!
//! This crate answers visitor questions in the portfolio owner's voice:
//! - Prompt templates and rendering
//! - Bounded per-conversation history
//! - A persona filter that catches answers mentioning their sources
//! - The engine tying retrieval, generation, and refinement together

pub mod engine;
pub mod error;
pub mod history;
pub mod persona;
pub mod prompt;

pub use engine::{
    ChatResources, ConversationEngine, EngineSettings, ERROR_FALLBACK, NO_INFORMATION_FALLBACK,
};
pub use error::ChatError;
pub use history::{ConversationHistory, Role, Turn};
pub use persona::{PersonaFilter, Verdict};
pub use prompt::{render, PromptError, PromptTemplates};

/// Result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
