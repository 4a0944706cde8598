//! # Ports Layer
//!
//! Driven ports the workload phase needs from the host.

pub mod outbound;

pub use outbound::{ContentRouting, HopProbe, ProviderStream};
