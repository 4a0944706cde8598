//! # Shared Types Crate
//!
//! This crate contains the data model every participant of a DHT experiment
//! exchanges over the rendezvous channel, plus the handful of primitives
//! (identity, subnet addressing, deadline) all subsystems agree on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Cross-subsystem types are defined here.
//! - **Immutable Records**: `ParticipantRecord` and `ItemRecord` are created
//!   once and never mutated after publication.
//! - **One Deadline**: Every blocking call in a run is bounded by the same
//!   `Deadline`; expiry is fatal.

pub mod deadline;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod lookup;

pub use deadline::{Deadline, DeadlineExceeded};
pub use entities::*;
pub use errors::*;
pub use identity::{LocalIdentity, Subnet};
pub use lookup::{LookupEvent, LookupResponse, QueryId};
