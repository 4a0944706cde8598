//! Result points recorded into the participant's Prometheus gauges.

use kt_04_result_reporter::{
    MetricsRecorder, RecordError, POINT_CONNECT_FAILURES, POINT_HOPS_TO_PROVIDER,
    POINT_RECORDS_FOUND, POINT_RECORDS_MISSED, POINT_ROUTING_TABLE_SIZE,
};
use testbed_telemetry::ExperimentMetrics;

pub struct PrometheusRecorder {
    metrics: ExperimentMetrics,
}

impl PrometheusRecorder {
    #[must_use]
    pub fn new(metrics: ExperimentMetrics) -> Self {
        Self { metrics }
    }
}

impl MetricsRecorder for PrometheusRecorder {
    #[allow(clippy::cast_possible_truncation)]
    fn record_point(&self, name: &'static str, value: f64) -> Result<(), RecordError> {
        let gauge = match name {
            POINT_HOPS_TO_PROVIDER => {
                return self
                    .metrics
                    .set_hops_to_provider(value)
                    .map_err(|err| RecordError::Sink {
                        point: name,
                        reason: err.to_string(),
                    });
            }
            POINT_ROUTING_TABLE_SIZE => self.metrics.routing_table_size(),
            POINT_RECORDS_FOUND => self.metrics.records_found(),
            POINT_RECORDS_MISSED => self.metrics.records_missed(),
            POINT_CONNECT_FAILURES => self.metrics.connect_failures(),
            _ => {
                return Err(RecordError::Sink {
                    point: name,
                    reason: "no gauge registered".to_string(),
                })
            }
        };
        gauge.set(value as i64);
        Ok(())
    }
}
