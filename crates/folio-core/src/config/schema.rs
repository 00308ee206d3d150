//! Configuration schema definitions.

use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Folio configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document corpus settings.
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Embedding service settings.
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Generation service settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Chatbot pipeline settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Contact-form mail settings.
    #[serde(default)]
    pub mail: MailConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Corpus configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the private documents.
    #[serde(default = "default_corpus_dir")]
    pub dir: PathBuf,

    /// Maximum chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// File extensions to ingest.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("chatbot/context")
}

fn default_chunk_size() -> usize {
    512
}

fn default_chunk_overlap() -> usize {
    30
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string(), "md".to_string(), "pdf".to_string()]
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: default_corpus_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            extensions: default_extensions(),
        }
    }
}

/// Embedding backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingsBackend {
    /// Hugging Face Inference feature-extraction pipeline.
    #[default]
    Huggingface,
    /// OpenAI-compatible `/v1/embeddings` endpoint.
    Openai,
}

/// Embeddings configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Backend to call.
    #[serde(default)]
    pub backend: EmbeddingsBackend,

    /// Model identifier; backend default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Base URL override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API token; taken from the environment when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Texts per request while indexing.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout.
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_batch_size() -> usize {
    32
}

fn default_embedding_timeout() -> u64 {
    30
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingsBackend::default(),
            model: None,
            base_url: None,
            api_key: None,
            batch_size: default_batch_size(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Generation configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// API token; taken from the environment when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Maximum output tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling parameter.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Per-request timeout.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_generation_model() -> String {
    "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string()
}

fn default_max_tokens() -> usize {
    100
}

fn default_temperature() -> f32 {
    0.4
}

fn default_top_p() -> f32 {
    0.95
}

fn default_generation_timeout() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// Chatbot pipeline configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Name the assistant speaks as.
    #[serde(default = "default_persona_name")]
    pub persona_name: String,

    /// Turns retained per conversation.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Most recent turns included in a prompt.
    #[serde(default = "default_prompt_history")]
    pub prompt_history: usize,

    /// Chunks retrieved per question.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    /// Similarity above which a response is treated as meta-commentary.
    #[serde(default = "default_persona_threshold")]
    pub persona_threshold: f32,

    /// Exemplars of phrasing the assistant must not use.
    #[serde(default = "default_forbidden_phrases")]
    pub forbidden_phrases: Vec<String>,

    /// Primary prompt override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_template: Option<String>,

    /// Refinement prompt override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement_template: Option<String>,
}

fn default_persona_name() -> String {
    "the portfolio owner".to_string()
}

fn default_history_limit() -> usize {
    10
}

fn default_prompt_history() -> usize {
    6
}

fn default_retrieval_k() -> usize {
    4
}

fn default_persona_threshold() -> f32 {
    0.7
}

/// Default forbidden-phrase exemplars.
pub fn default_forbidden_phrases() -> Vec<String> {
    [
        "based on the documents I have",
        "according to the context provided to me",
        "from the information I've been given",
        "the documents show that",
        "based on my knowledge base",
        "from the context I can see",
        "according to the sources I have",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            persona_name: default_persona_name(),
            history_limit: default_history_limit(),
            prompt_history: default_prompt_history(),
            retrieval_k: default_retrieval_k(),
            persona_threshold: default_persona_threshold(),
            forbidden_phrases: default_forbidden_phrases(),
            primary_template: None,
            refinement_template: None,
        }
    }
}

/// HTTP server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; `*` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Directory containing `index.html`.
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,

    /// Background video served at `/video`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_file: Option<PathBuf>,

    /// Idle time after which a chat session is evicted.
    #[serde(default = "default_session_idle")]
    pub session_idle_secs: u64,

    /// Interval between eviction sweeps.
    #[serde(default = "default_session_sweep")]
    pub session_sweep_secs: u64,

    /// Maximum concurrent chat sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Start the server even if the chatbot fails to initialize.
    #[serde(default = "default_true")]
    pub allow_degraded_start: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_site_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_session_idle() -> u64 {
    1800
}

fn default_session_sweep() -> u64 {
    60
}

fn default_max_sessions() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            static_dir: default_static_dir(),
            site_dir: default_site_dir(),
            video_file: None,
            session_idle_secs: default_session_idle(),
            session_sweep_secs: default_session_sweep(),
            max_sessions: default_max_sessions(),
            allow_degraded_start: true,
        }
    }
}

/// Contact-form mail configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_server: Option<String>,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// SMTP password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,

    /// Inbox receiving contact messages; defaults to `username`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Send timeout.
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_timeout() -> u64 {
    30
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_server: None,
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            to: None,
            timeout_secs: default_mail_timeout(),
        }
    }
}

impl MailConfig {
    /// Whether enough is set to attempt a send.
    pub fn is_configured(&self) -> bool {
        self.smtp_server.is_some() && self.username.is_some() && self.password.is_some()
    }

    /// Inbox that receives contact messages.
    pub fn recipient(&self) -> Option<&str> {
        self.to.as_deref().or(self.username.as_deref())
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
