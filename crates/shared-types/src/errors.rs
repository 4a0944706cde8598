//! # Error Types
//!
//! Defines error types produced by the external collaborators (DHT and
//! networking layer) and consumed across subsystems.

use thiserror::Error;

use crate::entities::PeerId;

/// Errors reported by a DHT capability adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DhtError {
    /// Dialling the target peer failed.
    #[error("Connect to {peer:?} failed: {reason}")]
    ConnectFailed { peer: PeerId, reason: String },

    /// Publishing a provider record failed.
    #[error("Provide failed: {0}")]
    ProvideFailed(String),

    /// The lookup event stream was already taken for this node.
    #[error("Lookup events already registered")]
    EventsAlreadyRegistered,

    /// The DHT node has shut down.
    #[error("DHT unavailable: {0}")]
    Unavailable(String),
}

/// Fatal errors while preparing the local network identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkSetupError {
    /// Subnet string could not be parsed as `a.b.c.d/prefix`.
    #[error("Invalid subnet '{0}'")]
    InvalidSubnet(String),

    /// Subnet cannot hold the requested host index.
    #[error("Subnet {subnet} has no host #{index}")]
    SubnetExhausted { subnet: String, index: u32 },

    /// The networking layer never reported ready.
    #[error("Network not initialized: {0}")]
    NotInitialized(String),
}
