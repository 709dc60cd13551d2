//! Tracing subscriber setup shared by MGC binaries

use crate::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive for the given crates
///
/// `tower_http` is always included so request spans show up at the same level.
pub fn default_directive(level: &str, crates: &[&str]) -> String {
    crates
        .iter()
        .chain(std::iter::once(&"tower_http"))
        .map(|krate| format!("{}={}", krate.replace('-', "_"), level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(level: &str, crates: &[&str]) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level, crates)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialise logging: {}", e)))
}
