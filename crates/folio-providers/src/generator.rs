//! Fixed-settings text generation on top of a [`Provider`].

use crate::openai::{OpenAIProvider, DEFAULT_MODEL};
use crate::{ChatOptions, Message, Provider, ProviderError, Result};
use folio_core::config::GenerationConfig;
use std::sync::Arc;
use std::time::Duration;

/// Returned by [`Generator::generate`] whenever the model cannot be reached.
pub const CONNECTION_FALLBACK: &str =
    "I'm having trouble connecting to my AI service right now. Please try again in a moment.";

/// Sampling settings applied to every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Model identifier.
    pub model: String,

    /// Maximum output tokens.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling parameter.
    pub top_p: f32,

    /// Per-call timeout.
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 100,
            temperature: 0.4,
            top_p: 0.95,
            timeout: Duration::from_secs(60),
        }
    }
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl GenerationSettings {
    fn options(&self) -> ChatOptions {
        ChatOptions::with_max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .top_p(self.top_p)
    }
}

/// Turns a prompt into text with fixed settings.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn Provider>,
    settings: GenerationSettings,
}

impl Generator {
    /// Create a generator over `provider`.
    pub fn new(provider: Arc<dyn Provider>, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    /// Build an OpenAI-compatible generator from configuration.
    pub fn from_config(config: &GenerationConfig) -> Self {
        let provider =
            OpenAIProvider::new(config.api_key.clone()).with_base_url(config.base_url.as_str());
        Self::new(Arc::new(provider), GenerationSettings::from(config))
    }

    /// The active settings.
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Generate a completion, surfacing failures.
    ///
    /// The prompt is sent as a single user message and the answer is
    /// trimmed.
    pub async fn try_generate(&self, prompt: &str) -> Result<String> {
        let messages = [Message::user(prompt)];
        let call = self
            .provider
            .chat(&self.settings.model, &messages, Some(self.settings.options()));

        let response = tokio::time::timeout(self.settings.timeout, call)
            .await
            .map_err(|_| ProviderError::Timeout(self.settings.timeout))??;

        Ok(response.content.trim().to_string())
    }

    /// Generate a completion, answering with [`CONNECTION_FALLBACK`] on any
    /// failure.
    pub async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    provider = self.provider.name(),
                    model = %self.settings.model,
                    retryable = e.is_retryable(),
                    "Generation failed: {}",
                    e
                );
                CONNECTION_FALLBACK.to_string()
            }
        }
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatResponse, StopReason, Usage};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records requests and answers with a fixed reply.
    struct RecordingProvider {
        reply: std::result::Result<String, u16>,
        seen: Mutex<Vec<(String, Vec<Message>, Option<ChatOptions>)>>,
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn chat(
            &self,
            model: &str,
            messages: &[Message],
            options: Option<ChatOptions>,
        ) -> Result<ChatResponse> {
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), messages.to_vec(), options));

            match &self.reply {
                Ok(content) => Ok(ChatResponse {
                    id: "1".into(),
                    model: model.into(),
                    content: content.clone(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                }),
                Err(status) => Err(ProviderError::from_status(*status, "boom", None)),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_sends_single_user_message() {
        let provider = Arc::new(RecordingProvider {
            reply: Ok("  Ten years in data engineering.\n".into()),
            seen: Mutex::new(Vec::new()),
        });
        let generator = Generator::new(provider.clone(), GenerationSettings::default());

        let text = generator.generate("What is your experience?").await;
        assert_eq!(text, "Ten years in data engineering.");

        let seen = provider.seen.lock().unwrap();
        let (model, messages, options) = &seen[0];
        assert_eq!(model, DEFAULT_MODEL);
        assert_eq!(messages, &vec![Message::user("What is your experience?")]);
        let options = options.as_ref().unwrap();
        assert_eq!(options.max_tokens, Some(100));
        assert_eq!(options.temperature, Some(0.4));
        assert_eq!(options.top_p, Some(0.95));
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_error() {
        let provider = Arc::new(RecordingProvider {
            reply: Err(503),
            seen: Mutex::new(Vec::new()),
        });
        let generator = Generator::new(provider, GenerationSettings::default());

        assert_eq!(generator.generate("hi").await, CONNECTION_FALLBACK);
        assert!(matches!(
            generator.try_generate("hi").await,
            Err(ProviderError::ServerError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "choices": [{ "message": { "content": "late" } }]
                    }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new(None).with_base_url(server.uri());
        let settings = GenerationSettings {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let generator = Generator::new(Arc::new(provider), settings);

        assert!(matches!(
            generator.try_generate("hi").await,
            Err(ProviderError::Timeout(_))
        ));
        assert_eq!(generator.generate("hi").await, CONNECTION_FALLBACK);
    }

    #[tokio::test]
    async fn test_from_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "model": "test/model", "max_tokens": 42 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "ok" }, "finish_reason": "stop" }]
            })))
            .mount(&server)
            .await;

        let config = GenerationConfig {
            base_url: server.uri(),
            model: "test/model".into(),
            max_tokens: 42,
            ..Default::default()
        };
        let generator = Generator::from_config(&config);
        assert_eq!(generator.try_generate("hi").await.unwrap(), "ok");
    }
}
