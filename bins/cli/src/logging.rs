//! Tracing subscriber setup.

use crate::format::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, writing to stderr.
///
/// `--quiet` and `--verbose` take precedence over `RUST_LOG`.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = match verbosity {
        Verbosity::Quiet => EnvFilter::new("error"),
        Verbosity::Verbose => EnvFilter::new("debug"),
        Verbosity::Default => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        },
    };

    // A subscriber may already be installed when embedded in a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
