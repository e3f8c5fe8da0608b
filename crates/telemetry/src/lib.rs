//! Logging bootstrap for the bookstore service.

use anyhow::anyhow;
use bookstore_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter from `RUST_LOG`, falling back to the configured directive.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .map_err(|e| anyhow!("invalid log filter '{}': {e}", settings.filter)),
    }
}

/// Install the global tracing subscriber.
///
/// Calling this twice is harmless; the second installation is ignored.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!(
            target: "bookstore-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }

    Ok(())
}
