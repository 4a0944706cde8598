//! # Reporter Errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The recorder rejected a point.
    #[error("Recording '{point}' failed: {reason}")]
    Sink { point: &'static str, reason: String },
}
