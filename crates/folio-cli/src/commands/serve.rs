//! Serve command.

use anyhow::Context;
use clap::Args;
use folio_chat::ChatResources;
use folio_core::config::Config;
use folio_gateway::{Gateway, MailError, SmtpMailer};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Serve command arguments.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind host (overrides gateway.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port number (overrides gateway.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Apply command-line overrides to the gateway section.
pub fn apply_overrides(args: &ServeArgs, config: &mut Config) {
    if let Some(host) = &args.host {
        config.gateway.host = host.clone();
    }
    if let Some(port) = args.port {
        config.gateway.port = port;
    }
}

/// Run the serve command.
pub async fn run(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);
    config.validate()?;

    let resources = match ChatResources::from_config(&config).await {
        Ok(resources) => {
            info!(chunks = resources.index.len(), "Chatbot ready");
            Some(Arc::new(resources))
        }
        Err(e) if config.gateway.allow_degraded_start => {
            error!("Error initializing chatbot: {}", e);
            None
        }
        Err(e) => return Err(e).context("Failed to initialize chatbot"),
    };

    let mut gateway = Gateway::new(config.gateway.clone(), resources);

    match SmtpMailer::from_config(&config.mail) {
        Ok(mailer) => gateway = gateway.with_mailer(Arc::new(mailer)),
        Err(MailError::NotConfigured) => {}
        Err(e) => warn!("Contact mail disabled: {}", e),
    }

    gateway.run().await?;
    Ok(())
}
