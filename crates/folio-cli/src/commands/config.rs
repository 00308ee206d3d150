//! Configuration management commands.

use clap::Args;
use folio_core::config::Config;
use folio_core::paths;
use serde_json::Value;
use std::path::{Path, PathBuf};

const SECRET_KEYS: &[&str] = &["api_key", "password"];

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration, secrets masked
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Path of the config file in use.
pub fn config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

/// JSON view of `config` with secret values masked.
pub fn redacted(config: &Config) -> anyhow::Result<Value> {
    let mut json = serde_json::to_value(config)?;
    mask_secrets(&mut json);
    Ok(json)
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) && child.is_string() {
                    *child = Value::String("[REDACTED]".to_string());
                } else {
                    mask_secrets(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}

/// Run the config command.
pub fn run(args: ConfigArgs, explicit: Option<&Path>, config: Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);
        }

        ConfigCommand::Path => {
            let path = config_path(explicit)?;
            let note = if path.exists() { "" } else { " (not found, using defaults)" };
            println!("{}{}", path.display(), note);
        }

        ConfigCommand::Validate => match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => anyhow::bail!("Configuration error: {}", e),
        },
    }

    Ok(())
}
