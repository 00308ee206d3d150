//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! and loaded back with identical field values.

use folio_core::config::{Config, EmbeddingsBackend};
use folio_core::SecretString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("folio.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gateway.port, config.gateway.port);
    assert_eq!(loaded.corpus.chunk_size, config.corpus.chunk_size);
    assert_eq!(loaded.corpus.chunk_overlap, config.corpus.chunk_overlap);
    assert_eq!(loaded.chat.forbidden_phrases, config.chat.forbidden_phrases);
    assert_eq!(loaded.generation.model, config.generation.model);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("folio.json5");

    let mut config = Config::default();
    config.gateway.port = 9090;
    config.corpus.dir = PathBuf::from("/srv/portfolio/context");
    config.embeddings.backend = EmbeddingsBackend::Openai;
    config.chat.persona_name = "Sam Doe".to_string();
    config.mail.password = Some(SecretString::new("hunter2"));
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gateway.port, 9090);
    assert_eq!(loaded.corpus.dir, PathBuf::from("/srv/portfolio/context"));
    assert_eq!(loaded.embeddings.backend, EmbeddingsBackend::Openai);
    assert_eq!(loaded.chat.persona_name, "Sam Doe");
    assert_eq!(
        loaded.mail.password.as_ref().map(|p| p.expose_secret()),
        Some("hunter2")
    );
}

#[test]
fn test_partial_file_uses_defaults() {
    let config = Config::parse(
        r#"{
            // comments and trailing commas are fine
            gateway: { port: 8080, },
            chat: { retrieval_k: 2 },
        }"#,
    )
    .unwrap();

    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.chat.retrieval_k, 2);
    assert_eq!(config.chat.history_limit, 10);
    assert_eq!(config.chat.prompt_history, 6);
    assert_eq!(config.corpus.chunk_size, 512);
}

#[test]
fn test_invalid_values_are_all_reported() {
    let mut config = Config::default();
    config.gateway.port = 0;
    config.corpus.chunk_overlap = config.corpus.chunk_size;
    config.chat.persona_threshold = 0.0;

    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("port"));
    assert!(message.contains("chunk_overlap"));
    assert!(message.contains("persona_threshold"));
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/folio.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}
