//! Structured logging setup.
//!
//! JSON output carries `timestamp`, `level`, `target`, the span fields
//! (`seq`, `cluster`, `peer`) and the event fields, ready for a log shipper.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global subscriber described by `config`.
pub(crate) fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if config.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init()
    };

    installed.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
