//! Folio CLI entry point.

use clap::Parser;
use folio_cli::{load_config, logging, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Dotenv first so it can feed both clap's env defaults and the config
    let dotenv = folio_core::env::load_dotenv();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init(&config.logging, cli.verbose);

    match dotenv {
        Ok(files) if !files.is_empty() => tracing::debug!(?files, "Loaded environment files"),
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to read environment file: {}", e),
    }

    run(cli, config).await
}
