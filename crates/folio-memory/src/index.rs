//! Immutable in-memory vector index.

use crate::embeddings::{cosine_similarity, EmbeddingProvider};
use crate::error::MemoryError;
use crate::{DocumentChunk, Result};

/// Texts embedded per request while building.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// A chunk with its embedding.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Chunk embedding.
    pub embedding: Vec<f32>,

    /// The chunk itself.
    pub chunk: DocumentChunk,
}

/// Chunks and their embeddings, ranked by cosine similarity at query time.
///
/// The index is built once and never mutated, so it can be shared across
/// sessions behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// An index with no entries. Queries return nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Embed every chunk and build the index.
    ///
    /// Any embedding failure aborts the build.
    pub async fn build(chunks: Vec<DocumentChunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        Self::build_batched(chunks, embedder, DEFAULT_BATCH_SIZE).await
    }

    /// Build with an explicit request batch size.
    pub async fn build_batched(
        chunks: Vec<DocumentChunk>,
        embedder: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = embedder.embed(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(MemoryError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(embeddings)
                    .map(|(chunk, embedding)| IndexEntry { embedding, chunk }),
            );
        }

        tracing::info!(chunks = entries.len(), "Built vector index");
        Ok(Self { entries })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// The `k` chunks most similar to `text`.
    pub async fn query(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<DocumentChunk>> {
        let scored = self.query_scored(text, k, embedder).await?;
        Ok(scored.into_iter().map(|(chunk, _)| chunk).collect())
    }

    /// Like [`query`](Self::query) but with similarity scores.
    ///
    /// Does not call the embedder when there is nothing to return.
    pub async fn query_scored(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<(DocumentChunk, f32)>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = embedder.embed_one(text).await?;
        Ok(self.search_by_vector(&query, k))
    }

    /// Rank entries against a precomputed vector.
    ///
    /// Results are ordered by descending similarity; equal scores keep
    /// insertion order.
    pub fn search_by_vector(&self, query: &[f32], k: usize) -> Vec<(DocumentChunk, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let score = cosine_similarity(query, &entry.embedding);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| (self.entries[i].chunk.clone(), score))
            .collect()
    }
}
