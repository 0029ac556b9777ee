//! Structured logging for Chainsign.
//!
//! Log level is taken from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the logging system with human readable output.
///
/// # Example
/// ```no_run
/// use chainsign_core::logging;
///
/// logging::init();
/// tracing::info!("Signing node started");
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}

/// Initialize the logging system with JSON output for log aggregation.
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true).with_thread_ids(true))
        .init();
}

/// Initialize logging according to configuration.
pub fn init_from_config(config: &LoggingConfig) {
    if config.json {
        init_json();
    } else {
        init();
    }
}
