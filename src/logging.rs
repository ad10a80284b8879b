//! Log subscriber setup for the binary.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "ironsieve=info";

/// Install a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_directive`.
///
/// # Errors
/// Returns an error if the directive is malformed or a global subscriber
/// is already installed.
pub fn init_logging(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| anyhow!("invalid log filter: {e}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("install log subscriber: {e}"))
}
