//! End-to-end answering over a temporary corpus.

use folio_chat::{ChatResources, ConversationEngine, NO_INFORMATION_FALLBACK};
use folio_integration_tests::{test_config, write_corpus, KeywordEmbedder, Reply, ScriptedProvider};
use folio_providers::{GenerationSettings, Generator, CONNECTION_FALLBACK};
use std::sync::Arc;
use tempfile::TempDir;

const CLEAN: &str = "I know Rust well.";
const META: &str = "Based on the documents, I know Rust.";

async fn setup() -> (TempDir, Arc<ChatResources>, Arc<ScriptedProvider>, Arc<KeywordEmbedder>) {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    let embedder = Arc::new(KeywordEmbedder::default());
    let provider = Arc::new(ScriptedProvider::new(CLEAN));
    let generator = Generator::new(provider.clone(), GenerationSettings::default());

    let resources = ChatResources::build(&test_config(dir.path()), embedder.clone(), generator)
        .await
        .unwrap();

    (dir, Arc::new(resources), provider, embedder)
}

#[tokio::test]
async fn test_index_skips_unusable_files() {
    let (_dir, resources, _, _) = setup().await;

    let mut sources: Vec<_> = resources
        .index
        .entries()
        .iter()
        .map(|e| e.chunk.source_id.clone())
        .collect();
    sources.sort();
    assert_eq!(sources, vec!["about.txt", "projects/app.md"]);
}

#[tokio::test]
async fn test_answer_uses_most_relevant_chunk() {
    let (_dir, resources, provider, _) = setup().await;
    let mut engine = ConversationEngine::new(resources);

    let answer = engine.get_response("Tell me about Rust").await;
    assert_eq!(answer, CLEAN);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("writes Rust every day"));
    assert!(!prompts[0].contains("Python app"));
    assert!(prompts[0].contains("Question: Tell me about Rust"));
}

#[tokio::test]
async fn test_meta_commentary_is_refined() {
    let (_dir, resources, provider, _) = setup().await;
    let mut engine = ConversationEngine::new(resources);

    provider.script([Reply::Text(META), Reply::Text(CLEAN)]);
    let answer = engine.get_response("What languages do you use?").await;
    assert_eq!(answer, CLEAN);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Original question: What languages do you use?"));
    assert!(prompts[1].contains(&format!("Your previous response: {}", META)));
}

#[tokio::test]
async fn test_refinement_gives_up_after_one_try() {
    let (_dir, resources, provider, _) = setup().await;
    let mut engine = ConversationEngine::new(resources);

    provider.script([Reply::Text(META), Reply::Text(META)]);
    let answer = engine.get_response("What languages do you use?").await;
    assert_eq!(answer, NO_INFORMATION_FALLBACK);
    assert_eq!(provider.prompts().len(), 2);
    assert_eq!(engine.history().last().unwrap().content, NO_INFORMATION_FALLBACK);
}

#[tokio::test]
async fn test_model_outage_returns_apology() {
    let (_dir, resources, provider, _) = setup().await;
    let mut engine = ConversationEngine::new(resources);

    provider.script([Reply::Fail]);
    assert_eq!(engine.get_response("Hello").await, CONNECTION_FALLBACK);

    // The conversation carries on afterwards
    let answer = engine.get_response("Tell me about Rust").await;
    assert_eq!(answer, CLEAN);
    let prompts = provider.prompts();
    assert!(prompts[1].contains("User: Hello"));
    assert!(prompts[1].contains(&format!("Assistant: {}", CONNECTION_FALLBACK)));
}

#[tokio::test]
async fn test_conversations_share_index_not_history() {
    let (_dir, resources, provider, embedder) = setup().await;
    let calls_after_build = embedder.calls();

    let mut first = ConversationEngine::new(resources.clone());
    let mut second = ConversationEngine::new(resources);

    first.get_response("My favourite colour is teal").await;
    second.get_response("Hello").await;

    let prompts = provider.prompts();
    assert!(!prompts[1].contains("teal"));
    assert_eq!(first.history().len(), 2);
    assert_eq!(second.history().len(), 2);

    // Each query embeds the question and checks the answer; nothing is re-indexed
    assert_eq!(embedder.calls(), calls_after_build + 4);
}
