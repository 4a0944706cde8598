//! # Result Reporter (KT-04)
//!
//! Turns a participant's run into named numeric points for an external
//! recorder.
//!
//! | Point | Value |
//! |-------|-------|
//! | `routing-table-size` | routing table size after bootstrap quiesced |
//! | `records-found` | discovery trials that found a provider |
//! | `records-missed` | discovery trials that did not |
//! | `hops-to-provider` | average provider hops over found trials |
//! | `bootstrap-connect-failures` | 1 if our bootstrap dial failed |
//!
//! With no found trials the average is undefined and `hops-to-provider` is
//! not emitted.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::RecordError;
pub use domain::summary::{AverageHops, ExperimentSummary};
pub use ports::outbound::{MetricsRecorder, RoutingTableProbe};
pub use service::{
    ResultReporter, POINT_CONNECT_FAILURES, POINT_HOPS_TO_PROVIDER, POINT_RECORDS_FOUND,
    POINT_RECORDS_MISSED, POINT_ROUTING_TABLE_SIZE,
};
