//! # ragchat-telemetry
//!
//! Logging setup for ragchat binaries and tests.
//!
//! - [`init_telemetry`] installs a human-readable `fmt` subscriber
//! - [`init_json_telemetry`] installs a JSON subscriber for log shipping
//! - [`init_stderr_telemetry`] keeps logs off stdout for interactive tools
//! - [`EventCapture`] records events in memory so tests can assert on logs
//!
//! The filter comes from `RUST_LOG` and defaults to `info`.

mod memory;

pub use memory::{CapturedEvent, EventCapture};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter directive when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

fn env_filter() -> EnvFilter {
    env_filter_or(DEFAULT_FILTER)
}

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a human-readable subscriber for `service_name`.
///
/// # Errors
///
/// Returns [`TelemetryError::Install`] if a global subscriber is already set.
pub fn init_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))?;
    tracing::debug!(service = service_name, "telemetry initialized");
    Ok(())
}

/// Install a JSON subscriber for `service_name`.
///
/// # Errors
///
/// Returns [`TelemetryError::Install`] if a global subscriber is already set.
pub fn init_json_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))?;
    tracing::debug!(service = service_name, "json telemetry initialized");
    Ok(())
}

/// Install a compact subscriber on stderr, leaving stdout to the program.
///
/// `default_filter` applies when `RUST_LOG` is not set.
///
/// # Errors
///
/// Returns [`TelemetryError::Install`] if a global subscriber is already set.
pub fn init_stderr_telemetry(service_name: &str, default_filter: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter_or(default_filter))
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))?;
    tracing::debug!(service = service_name, "stderr telemetry initialized");
    Ok(())
}
