//! Conversation engine error types.

use crate::prompt::PromptError;
use folio_memory::MemoryError;
use thiserror::Error;

/// Errors raised while answering a message.
///
/// These never reach the caller of
/// [`ConversationEngine::get_response`](crate::ConversationEngine::get_response);
/// they are translated into a fixed reply there.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Embedding, corpus, or index failure.
    #[error("Embedding error: {0}")]
    Embedding(#[from] MemoryError),

    /// Prompt template failure.
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// The refined response still reads as meta-commentary.
    #[error("Refined response still flagged (score {score:.3})")]
    RefinementExhausted {
        /// Persona score of the refined response.
        score: f32,
    },
}
