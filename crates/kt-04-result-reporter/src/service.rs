//! # Result Reporter Service

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::RecordError;
use crate::domain::summary::{AverageHops, ExperimentSummary};
use crate::ports::outbound::{MetricsRecorder, RoutingTableProbe};

pub const POINT_ROUTING_TABLE_SIZE: &str = "routing-table-size";
pub const POINT_RECORDS_FOUND: &str = "records-found";
pub const POINT_RECORDS_MISSED: &str = "records-missed";
pub const POINT_HOPS_TO_PROVIDER: &str = "hops-to-provider";
pub const POINT_CONNECT_FAILURES: &str = "bootstrap-connect-failures";

/// Emits a participant's results to a `MetricsRecorder`.
pub struct ResultReporter<M: MetricsRecorder + ?Sized> {
    recorder: Arc<M>,
}

impl<M: MetricsRecorder + ?Sized> ResultReporter<M> {
    pub fn new(recorder: Arc<M>) -> Self {
        Self { recorder }
    }

    /// Read the routing table size once; call after bootstrap quiesced.
    pub fn sample_routing_table<P: RoutingTableProbe + ?Sized>(&self, probe: &P) -> u64 {
        let size = u64::try_from(probe.routing_table_size()).unwrap_or(u64::MAX);
        info!(routing_table_size = size, "Routing table sampled");
        size
    }

    /// Emit every point of `summary`.
    ///
    /// # Returns
    ///
    /// The average that was computed, so callers can log or assert on it.
    ///
    /// # Errors
    ///
    /// The first point the recorder rejects.
    #[allow(clippy::cast_precision_loss)]
    pub fn report(&self, summary: &ExperimentSummary) -> Result<AverageHops, RecordError> {
        self.recorder
            .record_point(POINT_ROUTING_TABLE_SIZE, summary.routing_table_size as f64)?;
        self.recorder
            .record_point(POINT_RECORDS_FOUND, summary.records_found as f64)?;
        self.recorder
            .record_point(POINT_RECORDS_MISSED, summary.records_missed as f64)?;
        self.recorder
            .record_point(POINT_CONNECT_FAILURES, summary.connect_failures as f64)?;

        let average = summary.average_hops();
        match average {
            AverageHops::Defined(hops) => {
                self.recorder.record_point(POINT_HOPS_TO_PROVIDER, hops)?;
            }
            AverageHops::Undefined => {
                warn!("No records found, hops-to-provider undefined");
            }
        }

        info!(
            routing_table_size = summary.routing_table_size,
            records_found = summary.records_found,
            records_missed = summary.records_missed,
            connect_failures = summary.connect_failures,
            hops_to_provider = %average,
            "Results reported"
        );
        Ok(average)
    }
}
