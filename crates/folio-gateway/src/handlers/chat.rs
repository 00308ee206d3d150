//! Chat endpoint.

use crate::error::GatewayError;
use crate::server::AppState;
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Header carrying the session id when the body has none.
pub const SESSION_HEADER: &str = "x-session-id";

/// Chat request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// Visitor message.
    #[serde(default)]
    pub message: String,

    /// Conversation to continue.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Chatbot answer.
    pub response: String,

    /// Always true; failures use [`GatewayError`].
    pub success: bool,

    /// Conversation the answer belongs to.
    pub session_id: String,
}

/// `GET /chat`.
pub async fn chat_status() -> Json<Value> {
    Json(json!({ "status": "chat endpoint active" }))
}

/// `POST /chat`.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>> {
    let Json(request) = payload.map_err(|e| GatewayError::InvalidMessage(e.body_text()))?;

    if request.message.trim().is_empty() {
        return Err(GatewayError::InvalidMessage("Message is required".to_string()));
    }

    let resources = state
        .resources
        .as_ref()
        .ok_or(GatewayError::ChatbotUnavailable)?;

    let session_id = resolve_session_id(request.session_id.as_deref(), &headers);
    let engine = state.sessions.get_or_create(&session_id, resources).await;

    debug!(session = %session_id, "Answering chat message");
    let response = engine.lock().await.get_response(&request.message).await;

    Ok(Json(ChatReply {
        response,
        success: true,
        session_id,
    }))
}

/// Session id from the body, then the header, else a fresh one.
pub fn resolve_session_id(from_body: Option<&str>, headers: &HeaderMap) -> String {
    let from_header = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());

    [from_body, from_header]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
