//! # Testbed Telemetry
//!
//! Logging and metrics shared by every participant.
//!
//! ## Components
//!
//! - **Logging**: `tracing` subscriber with an env filter, pretty or JSON
//! - **Metrics**: per-run Prometheus registry holding the result gauges
//!
//! ## Usage
//!
//! ```rust,ignore
//! use testbed_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | unset | Full filter directive, wins over `KT_LOG_LEVEL` |
//! | `KT_LOG_LEVEL` | `info` | Log level filter |
//! | `KT_JSON_LOGS` | `true` in containers | JSON formatted output |
//! | `KT_SERVICE_NAME` | `kad-testbed` | Recorded on the startup line |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use metrics::{
    ExperimentMetrics, METRIC_CONNECT_FAILURES, METRIC_HOPS_TO_PROVIDER, METRIC_RECORDS_FOUND,
    METRIC_RECORDS_MISSED, METRIC_ROUTING_TABLE_SIZE,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Prometheus error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Metrics encoding produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Install the global logging subscriber.
///
/// Returns a guard to hold for the lifetime of the process.
///
/// # Errors
///
/// `TelemetryError::LoggingInit` on a bad filter or a subscriber that is
/// already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(config)?;
    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Keeps telemetry active; logs on shutdown.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
