//! Logging infrastructure for Hablar.
//!
//! Provides centralized tracing setup for the CLI.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with the CLI default (warnings only)
///
/// Lesson prompts share the terminal with log output, so the default
/// stays quiet. Override with RUST_LOG.
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging, using `default_level` unless RUST_LOG is set
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route logs through the test harness at debug level
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
