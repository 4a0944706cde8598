//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the host DHT node must implement for the bootstrap phase.

use async_trait::async_trait;
use std::collections::BTreeSet;

use shared_types::{DhtError, PeerHandle, PeerId};

/// Dial capability of the local DHT node.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the sequencer holds them behind
/// an `Arc` shared with the workload phase.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Establish a connection to `peer`, adding it to the routing table.
    async fn connect(&self, peer: &PeerHandle) -> Result<(), DhtError>;

    /// Tell the node which peers share its cluster.
    ///
    /// Called once, before any connect.
    fn mark_local_peers(&self, peers: &BTreeSet<PeerId>);
}
