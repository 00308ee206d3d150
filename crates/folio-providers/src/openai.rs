//! OpenAI-compatible chat completions provider.
//!
//! Speaks the `/chat/completions` protocol, which the Hugging Face router
//! exposes for hosted open models as well.

use crate::{ChatOptions, ChatResponse, Message, Provider, ProviderError, Result, StopReason, Usage};
use async_trait::async_trait;
use folio_core::SecretString;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default API base URL (Hugging Face router).
pub const DEFAULT_API_BASE: &str = "https://router.huggingface.co/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";

/// OpenAI-compatible chat provider.
pub struct OpenAIProvider {
    /// HTTP client.
    client: Client,

    /// Bearer token; requests are sent unauthenticated without one.
    api_key: Option<SecretString>,

    /// API base URL.
    api_base: String,
}

impl OpenAIProvider {
    /// Create a provider against the default base URL.
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether a token is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn parse_response(&self, response: OpenAIResponse) -> Result<ChatResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::internal("No choices in response"))?;

        let usage = response.usage.unwrap_or_default();

        Ok(ChatResponse {
            id: response.id.unwrap_or_default(),
            model: response.model.unwrap_or_default(),
            content: choice.message.content.unwrap_or_default(),
            stop_reason: StopReason::from_finish_reason(choice.finish_reason.as_deref()),
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatResponse> {
        let options = options.unwrap_or_default();

        let request = OpenAIRequest {
            model,
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            stream: false,
        };

        debug!("Sending chat completion request: model={}", model);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAIError>(&body)
                .map(|e| e.error.message())
                .unwrap_or(body);

            return Err(ProviderError::from_status(status.as_u16(), message, retry_after));
        }

        let response: OpenAIResponse = response.json().await?;
        self.parse_response(response)
    }
}

// Wire types

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    stream: bool,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// Error bodies come as `{"error": {"message": ..}}` or `{"error": ".."}`.
#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OpenAIErrorDetail {
    Object { message: String },
    Text(String),
}

impl OpenAIErrorDetail {
    fn message(self) -> String {
        match self {
            Self::Object { message } | Self::Text(message) => message,
        }
    }
}
