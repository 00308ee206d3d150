//! Corpus ingestion, embeddings, and vector retrieval for Folio.
//!
//! This crate provides:
//! - Document loading and recursive chunking
//! - Embedding generation via Hugging Face or OpenAI-compatible APIs
//! - An immutable in-memory vector index with cosine ranking

pub mod corpus;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod splitter;

pub use corpus::{load_documents, CorpusLoader, Document};
pub use embeddings::{cosine_similarity, EmbeddingProvider, HuggingFaceEmbeddings, OpenAIEmbeddings};
pub use error::MemoryError;
pub use index::{IndexEntry, VectorIndex};
pub use splitter::TextSplitter;

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// A bounded slice of a source document used as a retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentChunk {
    /// Chunk text.
    pub text: String,

    /// Source document path, relative to the corpus root.
    pub source_id: String,

    /// Zero-based ordinal of the chunk within its document.
    pub position: usize,
}

impl DocumentChunk {
    /// Create a new chunk.
    pub fn new(text: impl Into<String>, source_id: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
            position,
        }
    }
}
