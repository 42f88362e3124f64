//! Stderr logging for the `wasure` binary.

use crate::cli::args::LogLevel;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `--log-level` when it parses.
pub fn init(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
