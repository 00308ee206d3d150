//! Request and response types shared by providers.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    /// A visitor-side message; prompts are always sent this way.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// A model-side message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling settings for one completion. Unset fields use the service default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl ChatOptions {
    /// Options capping the answer at `max_tokens`.
    pub fn with_max_tokens(max_tokens: usize) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..Default::default()
        }
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set nucleus sampling mass.
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// A completed answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub model: String,
    pub content: String,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

/// Why generation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ContentFilter,
    Unknown,
}

impl StopReason {
    /// Map an OpenAI-style `finish_reason`; TGI backends report `eos`.
    pub fn from_finish_reason(reason: Option<&str>) -> Self {
        match reason {
            Some("stop" | "eos" | "stop_sequence") => Self::EndTurn,
            Some("length") => Self::MaxTokens,
            Some("content_filter") => Self::ContentFilter,
            _ => Self::Unknown,
        }
    }
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl Usage {
    /// Prompt plus completion tokens.
    pub fn total_tokens(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_roles() {
        let user = Message::user("Hello!");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "Hello!");
        assert_eq!(Message::assistant("Hi").role.as_str(), "assistant");
    }

    #[test]
    fn test_chat_options_serialization_skips_unset() {
        let opts = ChatOptions::with_max_tokens(100).temperature(0.4).top_p(0.95);
        let json = serde_json::to_value(opts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "max_tokens": 100, "temperature": 0.4f32, "top_p": 0.95f32 })
        );
        assert_eq!(
            serde_json::to_value(ChatOptions::default()).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn test_stop_reason() {
        assert_eq!(StopReason::from_finish_reason(Some("eos")), StopReason::EndTurn);
        assert_eq!(StopReason::from_finish_reason(Some("length")), StopReason::MaxTokens);
        assert_eq!(StopReason::from_finish_reason(None), StopReason::Unknown);
    }
}
