//! Configuration loading, environment overrides, and validation.

use super::{Config, EmbeddingsBackend};
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use crate::secret::SecretString;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when no file exists, then apply environment overrides.
    ///
    /// A file that exists but fails to parse is an error rather than a
    /// silent fallback.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        };

        let mut config = match loaded {
            Ok(config) => config,
            Err(ConfigError::NotFound(path)) => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(e),
        };

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from the default path, falling back to defaults if no file exists.
    pub fn load_or_default() -> Self {
        Self::load_with_env(None).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable config: {}", e);
            let mut config = Self::default();
            config.apply_env();
            config
        })
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(env::get_var);
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Credentials already present in the file are kept; everything else
    /// set in the environment wins over the file.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let hf_token = lookup(vars::HUGGINGFACE_API_KEY)
            .or_else(|| lookup(vars::HUGGINGFACEHUB_API_TOKEN));

        if self.generation.api_key.is_none() {
            self.generation.api_key = hf_token.clone().map(SecretString::new);
        }

        if self.embeddings.api_key.is_none() {
            self.embeddings.api_key = match self.embeddings.backend {
                EmbeddingsBackend::Huggingface => hf_token.map(SecretString::new),
                EmbeddingsBackend::Openai => lookup(vars::OPENAI_API_KEY).map(SecretString::new),
            };
        }

        if let Some(server) = lookup(vars::SMTP_SERVER) {
            self.mail.smtp_server = Some(server);
        }
        if let Some(port) = lookup(vars::SMTP_PORT).and_then(|p| p.parse().ok()) {
            self.mail.smtp_port = port;
        }
        if let Some(username) = lookup(vars::EMAIL_USERNAME) {
            self.mail.username = Some(username);
        }
        if let Some(password) = lookup(vars::EMAIL_PASSWORD) {
            self.mail.password = Some(SecretString::new(password));
        }

        if let Some(port) = lookup(vars::FOLIO_PORT).and_then(|p| p.parse().ok()) {
            self.gateway.port = port;
        }
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Port validation
        if self.gateway.port == 0 {
            errors.push("Gateway port cannot be 0".to_string());
        }

        // 2. Chunking
        if self.corpus.chunk_size == 0 {
            errors.push("Corpus chunk_size must be greater than 0".to_string());
        }
        if self.corpus.chunk_overlap >= self.corpus.chunk_size {
            errors.push(format!(
                "Corpus chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.corpus.chunk_overlap, self.corpus.chunk_size
            ));
        }

        // 3. Conversation memory
        if self.chat.history_limit == 0 {
            errors.push("Chat history_limit must be greater than 0".to_string());
        }
        if self.chat.prompt_history > self.chat.history_limit {
            errors.push(format!(
                "Chat prompt_history ({}) exceeds history_limit ({})",
                self.chat.prompt_history, self.chat.history_limit
            ));
        }

        // 4. Persona filter threshold
        let threshold = self.chat.persona_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            errors.push(format!(
                "Chat persona_threshold must be in (0, 1], got {}",
                threshold
            ));
        }

        // 5. Sampling parameters
        if self.generation.max_tokens == 0 {
            errors.push("Generation max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            errors.push(format!(
                "Generation top_p must be in [0, 1], got {}",
                self.generation.top_p
            ));
        }

        // 6. Timeouts
        for (name, secs) in [
            ("embeddings.timeout_secs", self.embeddings.timeout_secs),
            ("generation.timeout_secs", self.generation.timeout_secs),
            ("mail.timeout_secs", self.mail.timeout_secs),
            ("gateway.session_sweep_secs", self.gateway.session_sweep_secs),
        ] {
            if secs == 0 {
                errors.push(format!("{} must be greater than 0", name));
            }
        }

        // 7. Sizes
        if self.embeddings.batch_size == 0 {
            errors.push("Embeddings batch_size must be greater than 0".to_string());
        }
        if self.gateway.max_sessions == 0 {
            errors.push("Gateway max_sessions must be greater than 0".to_string());
        }

        // Return collected errors
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
