//! # Hop Counter (KT-03)
//!
//! Rebuilds "who learned whom from whom" out of the DHT's lookup events and
//! derives how many relay hops a provider lookup took.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): the `HopTable` and its derivation rule
//! - **Ports Layer** (`ports/`): the lookup event source
//! - **Service Layer** (`service.rs`): the shared table and the single
//!   consumer task that feeds it
//!
//! ## Ordering
//!
//! The derivation is order-sensitive: a `provider` entry is only right if
//! the `heard` events before it were already applied. One task consumes the
//! whole stream in arrival order; events are never fanned out.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::HopCounterError;
pub use domain::table::{ApplyOutcome, HopSubject, HopTable};
pub use ports::outbound::{LookupEventSource, LookupEventStream};
pub use service::{HopInstrumentor, InstrumentorExit, InstrumentorReport, SharedHopTable};
