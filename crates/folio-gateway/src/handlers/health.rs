//! Health endpoint.

use crate::server::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the chatbot failed to start.
    pub status: String,

    /// Gateway version.
    pub version: String,

    /// Live chat sessions.
    pub sessions: usize,

    /// Chunks in the vector index.
    pub index_chunks: usize,

    /// Chatbot status (`ok` or `unavailable`).
    pub chatbot: String,
}

/// `GET /health`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, chatbot, index_chunks) = match &state.resources {
        Some(resources) => ("ok", "ok", resources.index.len()),
        None => ("degraded", "unavailable", 0),
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.count().await,
        index_chunks,
        chatbot: chatbot.to_string(),
    })
}
