//! HTTP gateway for the Folio portfolio chatbot.
//!
//! This crate provides:
//! - `/chat` backed by one conversation engine per session
//! - `/contact` delivering visitor messages over SMTP
//! - `/health` plus the portfolio's static site and video
//! - Idle session eviction

pub mod error;
pub mod handlers;
pub mod mail;
pub mod server;
pub mod session;

pub use error::GatewayError;
pub use mail::{ContactForm, MailError, Mailer, SmtpMailer};
pub use server::{AppState, Gateway};
pub use session::{SessionInfo, SessionRegistry, SharedEngine};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use folio_chat::{ChatResources, EngineSettings, PersonaFilter, PromptTemplates};
    use folio_memory::{EmbeddingProvider, VectorIndex};
    use folio_providers::{
        ChatOptions, ChatResponse, GenerationSettings, Generator, Message, Provider, StopReason,
        Usage,
    };
    use std::sync::Arc;

    struct FlatEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FlatEmbedder {
        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, texts: &[String]) -> folio_memory::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    /// Replies with the prompt it was given.
    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn chat(
            &self,
            model: &str,
            messages: &[Message],
            _options: Option<ChatOptions>,
        ) -> folio_providers::Result<ChatResponse> {
            Ok(ChatResponse {
                id: "echo".into(),
                model: model.into(),
                content: messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    /// Resources over an empty index whose model echoes its prompt.
    pub async fn resources() -> Arc<ChatResources> {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(FlatEmbedder);
        let filter = PersonaFilter::new(embedder.clone(), Vec::new(), 0.7)
            .await
            .unwrap();

        Arc::new(ChatResources {
            index: VectorIndex::empty(),
            embedder,
            generator: Generator::new(Arc::new(EchoProvider), GenerationSettings::default()),
            filter,
            templates: PromptTemplates::default(),
            settings: EngineSettings::default(),
        })
    }
}
