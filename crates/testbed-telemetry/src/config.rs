//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name recorded on startup
    pub service_name: String,

    /// Filter directive (trace, debug, info, warn, error or a full directive)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "kad-testbed".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KT_SERVICE_NAME`: Service name (default: kad-testbed)
    /// - `RUST_LOG` or `KT_LOG_LEVEL`: Log filter (default: info)
    /// - `KT_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("KT_SERVICE_NAME").unwrap_or_else(|| "kad-testbed".to_string()),

            log_level: lookup("RUST_LOG")
                .or_else(|| lookup("KT_LOG_LEVEL"))
                .unwrap_or_else(|| "info".to_string()),

            json_logs: lookup("KT_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(is_container),
        }
    }
}
