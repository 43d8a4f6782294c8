//! Logging bootstrap
//!
//! Installs the global `tracing` subscriber used by the binary. Library code
//! only emits events; it never installs a subscriber on its own.

use crate::utils::error::{BatchError, Result};
use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered by `RUST_LOG` or, when unset, `level`
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| BatchError::Config(format!("Invalid log level '{}': {}", level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| BatchError::Config(format!("Failed to install log subscriber: {}", e)))
}
