//! Retrieval-augmented answering with persona enforcement.

use crate::error::ChatError;
use crate::history::{ConversationHistory, DEFAULT_HISTORY_LIMIT, DEFAULT_PROMPT_HISTORY};
use crate::persona::PersonaFilter;
use crate::prompt::PromptTemplates;
use crate::Result;
use folio_core::config::{ChatConfig, Config};
use folio_memory::{embeddings, CorpusLoader, EmbeddingProvider, TextSplitter, VectorIndex};
use folio_providers::Generator;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Reply when the refined answer still talks about its sources.
pub const NO_INFORMATION_FALLBACK: &str = "I'm sorry, I don't have that information.";

/// Reply when answering fails for any other reason.
pub const ERROR_FALLBACK: &str = "I'm sorry, I encountered an error. Please try again.";

/// Per-query tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Chunks retrieved per query.
    pub retrieval_k: usize,

    /// Turns kept per conversation.
    pub history_limit: usize,

    /// Turns included in the prompt.
    pub prompt_history: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            retrieval_k: 4,
            history_limit: DEFAULT_HISTORY_LIMIT,
            prompt_history: DEFAULT_PROMPT_HISTORY,
        }
    }
}

impl From<&ChatConfig> for EngineSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            retrieval_k: config.retrieval_k,
            history_limit: config.history_limit,
            prompt_history: config.prompt_history,
        }
    }
}

/// Read-only pieces shared by every conversation.
pub struct ChatResources {
    /// Corpus index.
    pub index: VectorIndex,

    /// Embedder used for retrieval queries.
    pub embedder: Arc<dyn EmbeddingProvider>,

    /// Language model.
    pub generator: Generator,

    /// Meta-commentary filter.
    pub filter: PersonaFilter,

    /// Answer and rewrite templates.
    pub templates: PromptTemplates,

    /// Per-query tuning.
    pub settings: EngineSettings,
}

impl ChatResources {
    /// Build everything from configuration: load and index the corpus,
    /// embed the forbidden phrases, and check the templates.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let embedder = embeddings::from_config(&config.embeddings);
        let generator = Generator::from_config(&config.generation);
        Self::build(config, embedder, generator).await
    }

    /// Like [`from_config`](Self::from_config) with caller-supplied
    /// embedder and generator.
    pub async fn build(
        config: &Config,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Generator,
    ) -> Result<Self> {
        let templates = PromptTemplates::from_config(&config.chat);
        templates.validate()?;

        let started = Instant::now();
        let documents = CorpusLoader::new(&config.corpus.dir)
            .with_extensions(&config.corpus.extensions)
            .load()
            .await;

        let splitter = TextSplitter::new(config.corpus.chunk_size, config.corpus.chunk_overlap)?;
        let chunks = splitter.split_documents(&documents);
        let index =
            VectorIndex::build_batched(chunks, embedder.as_ref(), config.embeddings.batch_size)
                .await?;

        info!(
            documents = documents.len(),
            chunks = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Indexed corpus"
        );

        let filter = PersonaFilter::new(
            embedder.clone(),
            config.chat.forbidden_phrases.clone(),
            config.chat.persona_threshold,
        )
        .await?;

        Ok(Self {
            index,
            embedder,
            generator,
            filter,
            templates,
            settings: EngineSettings::from(&config.chat),
        })
    }
}

impl std::fmt::Debug for ChatResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatResources")
            .field("index_chunks", &self.index.len())
            .field("generator", &self.generator)
            .field("filter", &self.filter)
            .field("settings", &self.settings)
            .finish()
    }
}

/// One conversation: shared resources plus its own history.
pub struct ConversationEngine {
    resources: Arc<ChatResources>,
    history: ConversationHistory,
}

impl ConversationEngine {
    /// Start an empty conversation.
    pub fn new(resources: Arc<ChatResources>) -> Self {
        let history = ConversationHistory::new(resources.settings.history_limit);
        Self { resources, history }
    }

    /// The conversation so far.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Shared resources.
    pub fn resources(&self) -> &Arc<ChatResources> {
        &self.resources
    }

    /// Answer `message`. Never fails: errors become a fixed apology.
    pub async fn get_response(&mut self, message: &str) -> String {
        self.history.push_user(message);

        let outcome = AssertUnwindSafe(self.answer(message)).catch_unwind().await;

        let response = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(ChatError::RefinementExhausted { score })) => {
                warn!(score, "Refined response still flagged, using fallback");
                NO_INFORMATION_FALLBACK.to_string()
            }
            Ok(Err(e)) => {
                error!("Failed to answer message: {}", e);
                ERROR_FALLBACK.to_string()
            }
            Err(panic) => {
                error!("Answering panicked: {}", panic_message(panic.as_ref()));
                ERROR_FALLBACK.to_string()
            }
        };

        self.history.push_assistant(response.as_str());
        response
    }

    async fn answer(&self, message: &str) -> Result<String> {
        let resources = &self.resources;

        let context = self.retrieve(message).await;
        let history = self.history.format_recent(resources.settings.prompt_history);
        let prompt = resources
            .templates
            .render_primary(&context, &history, message)?;

        let response = resources.generator.generate(&prompt).await;
        let verdict = resources.filter.check(&response).await;
        if !verdict.violating {
            return Ok(response);
        }

        warn!(score = verdict.score, "Detected meta-commentary, refining response");
        let prompt = resources.templates.render_refinement(message, &response)?;
        let refined = resources.generator.generate(&prompt).await;

        let verdict = resources.filter.check(&refined).await;
        if verdict.violating {
            return Err(ChatError::RefinementExhausted {
                score: verdict.score,
            });
        }

        Ok(refined)
    }

    /// Retrieved chunk texts joined by blank lines. Empty when retrieval
    /// fails.
    async fn retrieve(&self, message: &str) -> String {
        let resources = &self.resources;
        match resources
            .index
            .query(message, resources.settings.retrieval_k, resources.embedder.as_ref())
            .await
        {
            Ok(chunks) => {
                debug!(chunks = chunks.len(), "Retrieved context");
                chunks
                    .into_iter()
                    .map(|c| c.text)
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
            Err(e) => {
                warn!("Retrieval failed, answering without context: {}", ChatError::from(e));
                String::new()
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
