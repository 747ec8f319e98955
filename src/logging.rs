//! # Structured Logging Module
//!
//! Environment-aware structured logging for debugging concurrent event
//! processing. Console output by default; set `RELAY_LOG_FORMAT=json`
//! for machine-readable output and `RELAY_LOG` (or `RUST_LOG`) to adjust
//! the filter.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the global tracing subscriber once per process. Safe to
/// call repeatedly; later calls are no-ops, as is running under a test
/// harness that already installed a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_env("RELAY_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let json_output = std::env::var("RELAY_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if json_output {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_ansi(false).json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true))
                .try_init()
        };

        if result.is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}
