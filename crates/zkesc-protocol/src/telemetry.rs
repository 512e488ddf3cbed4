//! # Tracing Setup
//!
//! Installs a global `tracing-subscriber` fmt subscriber. `RUST_LOG`
//! overrides the filter passed in (normally
//! [`ProtocolConfig::log_filter`](crate::ProtocolConfig::log_filter)).

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Subscriber installation failed.
#[derive(Error, Debug)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Filter from `RUST_LOG` if set and valid, otherwise from `default_filter`,
/// otherwise `info`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn try_init(default_filter: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(default_filter));
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| TelemetryError(e.to_string()))
}

/// Install the global subscriber, ignoring an existing one.
pub fn init(default_filter: &str, format: LogFormat) {
    if try_init(default_filter, format).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
