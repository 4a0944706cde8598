//! # Shared Bus - Rendezvous Channel for Experiment Participants
//!
//! Topic-addressed broadcast plus named countable barriers. Participants use
//! it to exchange addresses and to gate phase transitions, without any
//! coordinator holding per-participant state.
//!
//! ## Contract
//!
//! - `publish(topic, value)` reaches every current AND future subscriber.
//! - `subscribe(topic)` yields every published value exactly once.
//! - `signal_and_wait(state, n)` returns the caller's 1-indexed arrival rank
//!   once `n` participants have signalled `state`.
//! - `signal_entry(state)` records completion without waiting;
//!   `barrier(state, n)` waits until `n` completions exist.
//!
//! ```text
//! ┌──────────────┐  publish()   ┌──────────────┐  subscribe()  ┌──────────────┐
//! │ Participant A│ ───────────→ │  Rendezvous  │ ────────────→ │ Participant B│
//! │              │ signal_entry │   (topics,   │   barrier()   │              │
//! └──────────────┘ ───────────→ │   counters)  │ ←──────────── └──────────────┘
//!                               └──────────────┘
//! ```
//!
//! ## Failure Mode
//!
//! A barrier whose threshold is never reached blocks forever. Callers wrap
//! every call with the experiment `Deadline`.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod barrier;
pub mod publisher;
pub mod subscriber;
pub mod topic;

pub use barrier::BarrierBoard;
pub use publisher::{InMemoryRendezvous, RendezvousChannel, RendezvousExt};
pub use subscriber::{RawSubscription, TopicSubscription};
pub use topic::Topic;

use thiserror::Error;

/// Errors from rendezvous operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RendezvousError {
    /// The rendezvous service went away.
    #[error("Rendezvous channel closed")]
    Closed,

    /// A value could not be serialized for publication.
    #[error("Failed to encode value for topic '{topic}': {reason}")]
    Encode { topic: String, reason: String },

    /// A received value did not match the topic's type.
    #[error("Failed to decode value from topic '{topic}': {reason}")]
    Decode { topic: String, reason: String },
}
