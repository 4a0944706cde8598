//! # Workload Errors

use shared_bus::RendezvousError;
use shared_types::{ContentKey, DeadlineExceeded, DhtError};
use thiserror::Error;

/// Fatal errors in the workload phase. Misses are not errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkloadError {
    /// The provider record for our own item could not be published.
    #[error("Provide for {key} failed: {source}")]
    Provide { key: ContentKey, source: DhtError },

    /// A find-provider request could not be issued.
    #[error("Find providers for {key} failed: {source}")]
    Lookup { key: ContentKey, source: DhtError },

    /// Discovery was asked to run over an empty item list.
    #[error("No items collected to search for")]
    NoItems,

    #[error(transparent)]
    Rendezvous(#[from] RendezvousError),

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}
