//! # Driven Ports (Outbound SPI)

use crate::domain::errors::RecordError;

/// External sink for named numeric points.
pub trait MetricsRecorder: Send + Sync {
    fn record_point(&self, name: &'static str, value: f64) -> Result<(), RecordError>;
}

/// Routing table introspection of the local DHT node.
pub trait RoutingTableProbe: Send + Sync {
    fn routing_table_size(&self) -> usize;
}
