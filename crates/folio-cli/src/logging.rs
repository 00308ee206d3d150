//! Tracing subscriber setup.

use folio_core::config::LoggingConfig;
use folio_core::env::{self, vars};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATES: &[&str] = &[
    "folio",
    "folio_cli",
    "folio_core",
    "folio_memory",
    "folio_providers",
    "folio_chat",
    "folio_gateway",
    "tower_http",
];

/// Level for our crates: `-v` flags win over the configured level.
pub fn effective_level<'a>(config: &'a LoggingConfig, verbose: u8) -> &'a str {
    match verbose {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    }
}

/// Filter directives logging our crates at `level` and everything else at `warn`.
pub fn default_directives(level: &str) -> String {
    std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|c| format!("{}={}", c, level)))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(config: &LoggingConfig, verbose: u8) -> EnvFilter {
    let fallback = || EnvFilter::new(default_directives(effective_level(config, verbose)));

    if verbose > 0 {
        return fallback();
    }

    env::get_var(vars::FOLIO_LOG)
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(fallback)
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig, verbose: u8) {
    let registry = tracing_subscriber::registry().with(build_filter(config, verbose));

    if config.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}
