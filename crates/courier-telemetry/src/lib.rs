//! # Courier Telemetry
//!
//! Observability for the dispatch pipeline.
//!
//! - **Logs**: `tracing` events rendered by a `tracing-subscriber` fmt layer,
//!   human-readable in development and JSON in containers
//! - **Metrics**: Prometheus counters for sent and skipped files, plus a
//!   batch duration histogram
//!
//! ## Usage
//!
//! ```rust,ignore
//! use courier_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // Pipeline runs here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COURIER_SERVICE_NAME` | `courier` | Service name attached to log lines |
//! | `COURIER_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `COURIER_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `COURIER_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, BATCHES_PROCESSED, BATCH_DURATION,
    FILES_SENT, FILES_SKIPPED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    /// Metric registration or encoding failed
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;

    tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
