//! Chat sessions over HTTP against a real index.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use folio_chat::ChatResources;
use folio_core::config::GatewayConfig;
use folio_gateway::handlers::{ChatReply, HealthResponse};
use folio_gateway::Gateway;
use folio_integration_tests::{test_config, write_corpus, KeywordEmbedder, ScriptedProvider};
use folio_providers::{GenerationSettings, Generator};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn gateway(config: GatewayConfig) -> (TempDir, Gateway, Arc<ScriptedProvider>) {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    let provider = Arc::new(ScriptedProvider::new("I know Rust well."));
    let generator = Generator::new(provider.clone(), GenerationSettings::default());
    let resources = ChatResources::build(
        &test_config(dir.path()),
        Arc::new(KeywordEmbedder::default()),
        generator,
    )
    .await
    .unwrap();

    let gateway = Gateway::new(config, Some(Arc::new(resources)));
    (dir, gateway, provider)
}

async fn chat(app: Router, message: &str, session: Option<&str>) -> (StatusCode, Value) {
    let mut body = json!({ "message": message });
    if let Some(session) = session {
        body["session_id"] = json!(session);
    }
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_sessions_keep_separate_histories() {
    let (_dir, gateway, provider) = gateway(GatewayConfig::default()).await;

    let (status, body) = chat(gateway.router(), "My favourite colour is teal", None).await;
    assert_eq!(status, StatusCode::OK);
    let reply: ChatReply = serde_json::from_value(body).unwrap();
    assert_eq!(reply.response, "I know Rust well.");
    let first = reply.session_id;

    let (_, body) = chat(gateway.router(), "Hello", None).await;
    let second = body["session_id"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    chat(gateway.router(), "What colour did I say?", Some(&first)).await;

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(!prompts[1].contains("teal"));
    assert!(prompts[2].contains("User: My favourite colour is teal"));
    assert_eq!(gateway.state().sessions.count().await, 2);
}

#[tokio::test]
async fn test_session_cap_evicts_oldest() {
    let config = GatewayConfig {
        max_sessions: 1,
        ..Default::default()
    };
    let (_dir, gateway, provider) = gateway(config).await;

    chat(gateway.router(), "Remember teal", Some("a")).await;
    chat(gateway.router(), "Hello", Some("b")).await;
    assert_eq!(gateway.state().sessions.count().await, 1);

    // Session "a" was evicted, so it starts over
    chat(gateway.router(), "Anything?", Some("a")).await;
    assert!(!provider.prompts()[2].contains("teal"));
}

#[tokio::test]
async fn test_health_reports_index() {
    let (_dir, gateway, _) = gateway(GatewayConfig::default()).await;
    chat(gateway.router(), "Hello", Some("visitor")).await;

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = gateway.router().oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.index_chunks, 2);
    assert_eq!(health.sessions, 1);
}
