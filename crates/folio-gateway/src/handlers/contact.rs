//! Contact form endpoint.

use crate::error::GatewayError;
use crate::mail::{ContactForm, MailError};
use crate::server::AppState;
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Reply after a successful send.
pub const CONTACT_THANKS: &str = "Thank you for your message! I'll get back to you soon.";

/// Contact response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReply {
    pub success: bool,
    pub message: String,
}

/// `POST /contact`.
pub async fn contact(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactReply>> {
    let Json(form) = payload.map_err(|e| MailError::InvalidInput(e.body_text()))?;
    form.validate()?;

    let mailer = state.mailer.as_ref().ok_or(MailError::NotConfigured)?;
    mailer.send(&form).await.map_err(GatewayError::from)?;

    Ok(Json(ContactReply {
        success: true,
        message: CONTACT_THANKS.to_string(),
    }))
}
