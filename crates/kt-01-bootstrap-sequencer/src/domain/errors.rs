//! # Bootstrap Errors

use shared_bus::RendezvousError;
use shared_types::{DeadlineExceeded, SequenceNumber};
use thiserror::Error;

/// Fatal errors in the bootstrap phase.
///
/// Connect failures are NOT here: they are tolerated and reported through
/// `BootstrapOutcome::connect_error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BootstrapError {
    /// No participant holds sequence 1.
    #[error("No bootstrap root (sequence 1) among {observed} observed participants")]
    MissingRoot { observed: usize },

    /// Two records carry the same sequence number.
    #[error("Sequence {0} assigned to more than one participant")]
    DuplicateSequence(SequenceNumber),

    /// Our own record never came back over the rendezvous channel.
    #[error("Own record (sequence {0}) not among observed participants")]
    OwnRecordMissing(SequenceNumber),

    #[error(transparent)]
    Rendezvous(#[from] RendezvousError),

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}
