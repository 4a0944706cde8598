//! # Ports Layer
//!
//! The sequencer drives no inbound API of its own; the host calls
//! `BootstrapSequencer` directly. It requires one capability from the DHT.

pub mod outbound;

pub use outbound::PeerConnector;
