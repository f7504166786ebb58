// src/logging.rs
// =============================================================================
// Diagnostic logging setup.
//
// Logs go to stderr so they never mix with the report on stdout (which may
// be JSON). The level comes from RUST_LOG; without it we show this crate's
// info messages and only warnings from dependencies.
//
// Examples:
//   RUST_LOG=debug                       -> everything, including per-page events
//   RUST_LOG=word_crawler=trace          -> also shows relief channel spills
// =============================================================================

use std::io::{self, IsTerminal};

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,word_crawler=info";

pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
