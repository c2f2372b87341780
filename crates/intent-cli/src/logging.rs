//! Tracing setup for the binary

use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "intentctl=info,intent_core=info";

/// Install a stderr subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbose` switches every target to
/// debug.
pub fn init(verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| CliError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
