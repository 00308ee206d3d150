//! Gateway error types.

use crate::mail::MailError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Reply when the chatbot failed to start.
pub const CHATBOT_UNAVAILABLE: &str = "Chatbot is not available. Please try again later.";

/// Reply when a contact message could not be sent.
pub const MAIL_FAILED: &str = "Failed to send email. Please try again later.";

/// Page returned for unknown routes and missing files.
pub const NOT_FOUND_PAGE: &str =
    "<h1>404 - Page Not Found</h1><p>The requested page could not be found.</p>";

/// Page returned for unexpected failures.
pub const INTERNAL_ERROR_PAGE: &str =
    "<h1>500 - Internal Server Error</h1><p>Something went wrong on our end.</p>";

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected chat request.
    #[error("Invalid chat request: {0}")]
    InvalidMessage(String),

    /// The conversation engine could not be built at startup.
    #[error("Chatbot unavailable")]
    ChatbotUnavailable,

    /// Contact form or mail delivery failure.
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// Not found error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidMessage(_) => StatusCode::BAD_REQUEST,
            Self::Mail(MailError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::InvalidMessage(reason) => {
                (status, Json(json!({ "response": reason, "success": false }))).into_response()
            }
            Self::ChatbotUnavailable => (
                status,
                Json(json!({ "response": CHATBOT_UNAVAILABLE, "success": false })),
            )
                .into_response(),
            Self::Mail(MailError::InvalidInput(reason)) => {
                (status, Json(json!({ "success": false, "message": reason }))).into_response()
            }
            Self::Mail(e) => {
                tracing::error!("Contact form error: {}", e);
                (status, Json(json!({ "success": false, "message": MAIL_FAILED }))).into_response()
            }
            Self::NotFound(_) => (status, Html(NOT_FOUND_PAGE)).into_response(),
            other => {
                tracing::error!("Request failed: {}", other);
                (status, Html(INTERNAL_ERROR_PAGE)).into_response()
            }
        }
    }
}
