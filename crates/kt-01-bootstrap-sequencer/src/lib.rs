//! # Bootstrap Sequencer (KT-01)
//!
//! Gives every participant exactly one bootstrap target such that the
//! participant → target edges span the whole fleet, and serialises the
//! joins so nobody dials a peer that has not finished its own bootstrap.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure target selection, no I/O
//! - **Ports Layer** (`ports/`): the connect capability of the DHT
//! - **Service Layer** (`service.rs`): rendezvous phases wired to the ports
//!
//! ## Phases
//!
//! ```text
//! signal_and_wait(dht-init-completed, N)  ──→ sequence number s
//! publish(nodeinfo, record) + collect N   ──→ fleet view
//! plan (single-root | multi-cluster)      ──→ target
//! s == 1 : signal_entry(bootstrap-completed)
//! s  > 1 : barrier(bootstrap-completed, s-1) → connect → settle → signal_entry
//! signal_and_wait(dht-bootstrap-completed, N)
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::BootstrapError;
pub use domain::plan::{fleet_edges, plan_bootstrap, BootstrapMode, BootstrapPlan, BootstrapRole};
pub use ports::outbound::PeerConnector;
pub use service::{
    BootstrapOutcome, BootstrapSequencer, SequencerConfig, BOOTSTRAP_STATE,
    FLEET_BOOTSTRAPPED_STATE, INIT_STATE, NODE_INFO_TOPIC,
};
