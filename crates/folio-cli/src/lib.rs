//! Folio command-line interface.

pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use folio_core::config::Config;
use std::path::PathBuf;

/// Folio - portfolio chatbot server
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "FOLIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build the index and start the HTTP server
    Serve(commands::serve::ServeArgs),

    /// Chat with the bot in the terminal
    Chat,

    /// Load and chunk the corpus, optionally running a query
    Index(commands::index::IndexArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Load the configuration the CLI was pointed at, with environment overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    Ok(Config::load_with_env(cli.config.as_deref())?)
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, config).await,
        Commands::Chat => commands::chat::run(config).await,
        Commands::Index(args) => commands::index::run(args, config).await,
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref(), config),
        Commands::Version => {
            println!("folio {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_version() {
        let cli = Cli::try_parse_from(["folio", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["folio", "serve", "--host", "0.0.0.0", "--port", "9090"])
            .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(9090));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["folio", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.host.is_none());
                assert!(args.port.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_parse_index_query() {
        let cli =
            Cli::try_parse_from(["folio", "index", "--query", "rust projects", "-k", "2"]).unwrap();
        match cli.command {
            Commands::Index(args) => {
                assert_eq!(args.query.as_deref(), Some("rust projects"));
                assert_eq!(args.k, 2);
            }
            _ => panic!("Expected Index command"),
        }
    }

    #[test]
    fn test_parse_index_default_k() {
        let cli = Cli::try_parse_from(["folio", "index"]).unwrap();
        match cli.command {
            Commands::Index(args) => {
                assert!(args.query.is_none());
                assert_eq!(args.k, 4);
            }
            _ => panic!("Expected Index command"),
        }
    }

    #[test]
    fn test_parse_config_subcommands() {
        for (name, expected) in [
            ("show", "show"),
            ("path", "path"),
            ("validate", "validate"),
        ] {
            let cli = Cli::try_parse_from(["folio", "config", name]).unwrap();
            match cli.command {
                Commands::Config(args) => {
                    let parsed = match args.command {
                        commands::config::ConfigCommand::Show => "show",
                        commands::config::ConfigCommand::Path => "path",
                        commands::config::ConfigCommand::Validate => "validate",
                    };
                    assert_eq!(parsed, expected);
                }
                _ => panic!("Expected Config command"),
            }
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["folio", "chat", "-vv", "--config", "/tmp/folio.json5"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Chat));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/folio.json5")));
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Cli::try_parse_from(["folio", "deploy"]).is_err());
    }
}
