//! Fakes and fixtures shared by the integration tests.

use async_trait::async_trait;
use folio_core::config::Config;
use folio_memory::EmbeddingProvider;
use folio_providers::{
    ChatOptions, ChatResponse, Message, Provider, ProviderError, StopReason, Usage,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Words the fake embedder gives a dimension each.
pub const VOCABULARY: &[&str] = &["rust", "python", "data", "award", "documents", "hello"];

/// Embeds text as keyword counts over [`VOCABULARY`] plus a small bias.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    /// Vector for one text.
    pub fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = VOCABULARY
            .iter()
            .map(|w| lower.matches(w).count() as f32)
            .collect();
        v.push(0.1);
        v
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn dimension(&self) -> usize {
        VOCABULARY.len() + 1
    }

    async fn embed(&self, texts: &[String]) -> folio_memory::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Scripted reply.
pub enum Reply {
    Text(&'static str),
    Fail,
}

/// Plays back scripted replies, then a default, recording every prompt.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Reply>>,
    default_reply: &'static str,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Answer every prompt with `default_reply` once the script runs out.
    pub fn new(default_reply: &'static str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue replies for the next calls.
    pub fn script(&self, replies: impl IntoIterator<Item = Reply>) {
        self.script.lock().unwrap().extend(replies);
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        _options: Option<ChatOptions>,
    ) -> folio_providers::Result<ChatResponse> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);

        let next = self.script.lock().unwrap().pop_front();
        let content = match next {
            Some(Reply::Text(text)) => text,
            Some(Reply::Fail) => {
                return Err(ProviderError::server_error(503, "model is loading"));
            }
            None => self.default_reply,
        };

        Ok(ChatResponse {
            id: "scripted".into(),
            model: model.into(),
            content: content.to_string(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }
}

/// Write a small portfolio corpus into `dir`.
pub fn write_corpus(dir: &Path) {
    std::fs::create_dir_all(dir.join("projects")).unwrap();
    std::fs::write(
        dir.join("about.txt"),
        "I am a data engineer who writes Rust every day.",
    )
    .unwrap();
    std::fs::write(
        dir.join("projects/app.md"),
        "Built a Python app that won an award.",
    )
    .unwrap();
    std::fs::write(dir.join("empty.txt"), "").unwrap();
    std::fs::write(dir.join("broken.txt"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
    std::fs::write(dir.join("notes.csv"), "rust,python").unwrap();
}

/// Config indexing `corpus_dir` with one retrieved chunk per query.
pub fn test_config(corpus_dir: &Path) -> Config {
    let mut config = Config::default();
    config.corpus.dir = corpus_dir.to_path_buf();
    config.corpus.chunk_size = 200;
    config.corpus.chunk_overlap = 20;
    config.chat.retrieval_k = 1;
    config.chat.persona_threshold = 0.5;
    config.chat.forbidden_phrases = vec!["based on the documents".to_string()];
    config
}
