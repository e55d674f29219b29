//! Logging setup for binaries and tests
//!
//! Library code emits through `tracing` and `log`; this installs a
//! `tracing-subscriber` fmt subscriber that receives both.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` overrides `default_level` when set. Returns `false` if a
/// subscriber was already installed, which is not an error.
pub fn init_logging(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
