//! HTTP route handlers.

pub mod chat;
pub mod contact;
pub mod health;
pub mod site;

pub use chat::{chat, chat_status, ChatReply, ChatRequest, SESSION_HEADER};
pub use contact::{contact, ContactReply, CONTACT_THANKS};
pub use health::{health, HealthResponse};
pub use site::{index, not_found, video};
