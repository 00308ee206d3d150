//! Contact form delivery over SMTP.

use async_trait::async_trait;
use folio_core::config::MailConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Mail delivery errors.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP settings are incomplete.
    #[error("Mail is not configured")]
    NotConfigured,

    /// The submitted form is unusable.
    #[error("{0}")]
    InvalidInput(String),

    /// Building or sending the message failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// The relay did not answer in time.
    #[error("Send timed out after {0:?}")]
    Timeout(Duration),
}

/// A visitor's contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Check required fields and parse the visitor's address.
    pub fn validate(&self) -> Result<Address, MailError> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(MailError::InvalidInput(format!("Field '{}' is required", name)));
        }

        self.email
            .trim()
            .parse::<Address>()
            .map_err(|_| MailError::InvalidInput("Invalid email address".to_string()))
    }

    /// Visitor's full name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Subject line of the delivered message.
    pub fn subject_line(&self) -> String {
        format!("Portfolio Contact: {}", self.subject.trim())
    }

    /// Plain-text body of the delivered message.
    pub fn body(&self) -> String {
        format!(
            "{}\n\nBest regards,\n{} {}\n{}",
            self.message, self.first_name, self.last_name, self.email
        )
    }
}

/// Delivers contact form submissions.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one submission.
    async fn send(&self, form: &ContactForm) -> Result<(), MailError>;
}

/// Sends through a STARTTLS relay with username/password login.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    timeout: Duration,
}

impl SmtpMailer {
    /// Build a mailer from the mail config section.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let (Some(server), Some(username), Some(password)) = (
            config.smtp_server.as_deref(),
            config.username.as_deref(),
            config.password.as_ref(),
        ) else {
            return Err(MailError::NotConfigured);
        };

        let parse = |addr: &str| {
            addr.parse::<Address>()
                .map(|a| Mailbox::new(None, a))
                .map_err(|e| MailError::Send(format!("Invalid address '{}': {}", addr, e)))
        };
        let from = parse(username)?;
        let to = parse(config.recipient().unwrap_or(username))?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
            .map_err(|e| MailError::Send(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                username.to_string(),
                password.expose_secret().to_string(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            timeout,
        })
    }

    /// Compose the outgoing message.
    pub fn compose(&self, form: &ContactForm) -> Result<Message, MailError> {
        let visitor = form.validate()?;

        Message::builder()
            .from(self.from.clone())
            .reply_to(Mailbox::new(Some(form.full_name()), visitor))
            .to(self.to.clone())
            .subject(form.subject_line())
            .header(ContentType::TEXT_PLAIN)
            .body(form.body())
            .map_err(|e| MailError::Send(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, form: &ContactForm) -> Result<(), MailError> {
        let message = self.compose(form)?;

        tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| MailError::Timeout(self.timeout))?
            .map_err(|e| MailError::Send(e.to_string()))?;

        tracing::info!(to = %self.to, "Contact message sent");
        Ok(())
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .field("timeout", &self.timeout)
            .finish()
    }
}
