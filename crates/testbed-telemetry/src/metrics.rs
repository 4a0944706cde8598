//! Prometheus metrics for one experiment run.
//!
//! All metrics follow the naming convention: `kt_<metric>`.
//! Each participant owns its own `Registry`, so a fleet running in one
//! process keeps its numbers apart.
//!
//! `kt_hops_to_provider` is registered on first use: a run without a
//! successful trial has no average and exports no line for it.

use std::fmt;

use prometheus::{Encoder, Gauge, IntGauge, Registry, TextEncoder};

use crate::TelemetryError;

pub const METRIC_ROUTING_TABLE_SIZE: &str = "kt_routing_table_size";
pub const METRIC_RECORDS_FOUND: &str = "kt_records_found";
pub const METRIC_RECORDS_MISSED: &str = "kt_records_missed";
pub const METRIC_HOPS_TO_PROVIDER: &str = "kt_hops_to_provider";
pub const METRIC_CONNECT_FAILURES: &str = "kt_bootstrap_connect_failures";

/// Result gauges for one participant.
#[derive(Clone)]
pub struct ExperimentMetrics {
    registry: Registry,
    routing_table_size: IntGauge,
    records_found: IntGauge,
    records_missed: IntGauge,
    hops_to_provider: Gauge,
    connect_failures: IntGauge,
}

impl fmt::Debug for ExperimentMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentMetrics")
            .field("records_found", &self.records_found.get())
            .field("records_missed", &self.records_missed.get())
            .field("hops_to_provider", &self.hops_to_provider())
            .finish_non_exhaustive()
    }
}

impl ExperimentMetrics {
    /// Create the gauges in a fresh registry. The hops gauge waits for
    /// [`Self::set_hops_to_provider`].
    ///
    /// # Errors
    ///
    /// Registration failure from Prometheus.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let routing_table_size = IntGauge::new(
            METRIC_ROUTING_TABLE_SIZE,
            "DHT routing table size after bootstrap quiesced",
        )?;
        let records_found =
            IntGauge::new(METRIC_RECORDS_FOUND, "Discovery trials that found a provider")?;
        let records_missed =
            IntGauge::new(METRIC_RECORDS_MISSED, "Discovery trials that found no provider")?;
        let hops_to_provider = Gauge::new(
            METRIC_HOPS_TO_PROVIDER,
            "Average relay hops to the provider over found trials",
        )?;
        let connect_failures = IntGauge::new(
            METRIC_CONNECT_FAILURES,
            "Bootstrap dials that failed (participant continued)",
        )?;

        registry.register(Box::new(routing_table_size.clone()))?;
        registry.register(Box::new(records_found.clone()))?;
        registry.register(Box::new(records_missed.clone()))?;
        registry.register(Box::new(connect_failures.clone()))?;

        Ok(Self {
            registry,
            routing_table_size,
            records_found,
            records_missed,
            hops_to_provider,
            connect_failures,
        })
    }

    #[must_use]
    pub fn routing_table_size(&self) -> &IntGauge {
        &self.routing_table_size
    }

    #[must_use]
    pub fn records_found(&self) -> &IntGauge {
        &self.records_found
    }

    #[must_use]
    pub fn records_missed(&self) -> &IntGauge {
        &self.records_missed
    }

    /// Average hops, or `None` while it has never been set.
    #[must_use]
    pub fn hops_to_provider(&self) -> Option<f64> {
        self.registry
            .gather()
            .iter()
            .any(|family| family.get_name() == METRIC_HOPS_TO_PROVIDER)
            .then(|| self.hops_to_provider.get())
    }

    /// Register the hops gauge if needed, then set it.
    ///
    /// # Errors
    ///
    /// Registration failure other than the gauge already being present.
    pub fn set_hops_to_provider(&self, hops: f64) -> Result<(), TelemetryError> {
        match self.registry.register(Box::new(self.hops_to_provider.clone())) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(err) => return Err(err.into()),
        }
        self.hops_to_provider.set(hops);
        Ok(())
    }

    #[must_use]
    pub fn connect_failures(&self) -> &IntGauge {
        &self.connect_failures
    }

    /// Encode every gauge as Prometheus text format.
    ///
    /// # Errors
    ///
    /// Encoder failure or non UTF-8 output.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
