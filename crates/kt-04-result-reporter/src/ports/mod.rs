//! # Ports Layer

pub mod outbound;

pub use outbound::{MetricsRecorder, RoutingTableProbe};
