//! # Hop Counter Errors

use shared_types::DhtError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HopCounterError {
    /// The DHT refused to hand out its lookup event stream.
    #[error("Lookup event registration failed: {0}")]
    Registration(#[from] DhtError),
}
