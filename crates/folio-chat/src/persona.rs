//! Meta-commentary detection by embedding similarity.
//!
//! A response is flagged when it is semantically close to any forbidden
//! phrase ("based on the documents", "according to the context", ...).

use folio_memory::{cosine_similarity, EmbeddingProvider, MemoryError};
use std::sync::Arc;

/// Similarity above which a response is flagged.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Result of checking one response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Whether the response should be rewritten.
    pub violating: bool,

    /// Highest similarity to any forbidden phrase.
    pub score: f32,
}

impl Verdict {
    /// A passing verdict with no similarity.
    pub fn clean() -> Self {
        Self {
            violating: false,
            score: 0.0,
        }
    }
}

struct Exemplar {
    phrase: String,
    embedding: Vec<f32>,
}

/// Flags responses that talk about their sources.
pub struct PersonaFilter {
    embedder: Arc<dyn EmbeddingProvider>,
    exemplars: Vec<Exemplar>,
    threshold: f32,
}

impl PersonaFilter {
    /// Embed the forbidden phrases once.
    pub async fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        phrases: Vec<String>,
        threshold: f32,
    ) -> Result<Self, MemoryError> {
        let embeddings = if phrases.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&phrases).await?
        };

        if embeddings.len() != phrases.len() {
            return Err(MemoryError::Embedding(format!(
                "Expected {} exemplar embeddings, got {}",
                phrases.len(),
                embeddings.len()
            )));
        }

        let exemplars = phrases
            .into_iter()
            .zip(embeddings)
            .map(|(phrase, embedding)| Exemplar { phrase, embedding })
            .collect::<Vec<_>>();

        tracing::debug!(exemplars = exemplars.len(), threshold, "Persona filter ready");

        Ok(Self {
            embedder,
            exemplars,
            threshold,
        })
    }

    /// Flag threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Forbidden phrases, in configured order.
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.exemplars.iter().map(|e| e.phrase.as_str())
    }

    /// Score `response` against every exemplar.
    pub async fn is_violating(&self, response: &str) -> Result<Verdict, MemoryError> {
        if self.exemplars.is_empty() {
            return Ok(Verdict::clean());
        }

        let embedding = self.embedder.embed_one(response).await?;
        let score = self
            .exemplars
            .iter()
            .map(|e| cosine_similarity(&embedding, &e.embedding))
            .fold(f32::NEG_INFINITY, f32::max);

        Ok(Verdict {
            violating: score > self.threshold,
            score,
        })
    }

    /// Like [`is_violating`](Self::is_violating), but lets the response
    /// through when it cannot be embedded.
    pub async fn check(&self, response: &str) -> Verdict {
        match self.is_violating(response).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Persona check skipped: {}", e);
                Verdict::clean()
            }
        }
    }
}

impl std::fmt::Debug for PersonaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaFilter")
            .field("exemplars", &self.exemplars.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}
