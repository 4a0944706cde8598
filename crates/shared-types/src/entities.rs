//! # Core Domain Entities
//!
//! Defines the records broadcast between participants.
//!
//! ## Clusters
//!
//! - **Identity**: `PeerId`, `PeerHandle`
//! - **Topology**: `ClusterId`, `ParticipantRecord`, `SequenceNumber`
//! - **Content**: `ContentKey`, `ItemRecord`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::net::SocketAddr;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Arrival rank handed out by a rendezvous barrier (1-indexed).
pub type SequenceNumber = u64;

/// Multihash code for SHA-256.
const MULTIHASH_SHA2_256: u8 = 0x12;

/// Multihash digest length for SHA-256.
const MULTIHASH_SHA2_256_LEN: u8 = 0x20;

// =============================================================================
// IDENTITY
// =============================================================================

/// Unique identifier for a participant, derived from its public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PeerId(pub Hash);

impl PeerId {
    /// Derive a peer id from raw public key bytes.
    #[must_use]
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let digest = Sha256::digest(public_key);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Abbreviated form for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.short())
    }
}

/// Everything another participant needs to dial us: identity plus addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerHandle {
    /// Identity of the peer.
    pub id: PeerId,
    /// Addresses the peer listens on.
    pub addrs: Vec<SocketAddr>,
}

impl PeerHandle {
    #[must_use]
    pub fn new(id: PeerId, addrs: Vec<SocketAddr>) -> Self {
        Self { id, addrs }
    }
}

impl fmt::Display for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}: [", self.id)?;
        for (i, addr) in self.addrs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{addr}")?;
        }
        write!(f, "]}}")
    }
}

// =============================================================================
// TOPOLOGY
// =============================================================================

/// Named subset of participants that bootstrap hierarchically from each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub String);

impl ClusterId {
    /// Name of the implicit cluster used when none is configured.
    pub const GLOBAL: &'static str = "global";

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The single global cluster.
    #[must_use]
    pub fn global() -> Self {
        Self(Self::GLOBAL.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClusterId {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Published once per participant after sequence numbers are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// How to reach the participant.
    pub peer: PeerHandle,
    /// Cluster the participant belongs to.
    pub cluster: ClusterId,
    /// Arrival rank at the initialisation barrier.
    pub sequence: SequenceNumber,
}

impl ParticipantRecord {
    #[must_use]
    pub fn new(peer: PeerHandle, cluster: ClusterId, sequence: SequenceNumber) -> Self {
        Self {
            peer,
            cluster,
            sequence,
        }
    }

    /// Whether this participant is the global bootstrap root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.sequence == 1
    }
}

// =============================================================================
// CONTENT
// =============================================================================

/// Content-addressed identifier: a SHA-256 multihash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentKey {
    digest: Hash,
}

impl ContentKey {
    /// Hash an arbitrary payload into a content key.
    #[must_use]
    pub fn from_payload(payload: &[u8]) -> Self {
        let digest = Sha256::digest(payload);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self { digest: bytes }
    }

    /// Content key announced by a participant: `"Hello from <handle>"`.
    #[must_use]
    pub fn for_peer(peer: &PeerHandle) -> Self {
        Self::from_payload(format!("Hello from {peer}").as_bytes())
    }

    #[must_use]
    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    /// Multihash encoding (`code || length || digest`).
    #[must_use]
    pub fn to_multihash(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(34);
        bytes.push(MULTIHASH_SHA2_256);
        bytes.push(MULTIHASH_SHA2_256_LEN);
        bytes.extend_from_slice(&self.digest);
        bytes
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_multihash()))
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", hex::encode(&self.digest[..6]))
    }
}

/// One announced item, broadcast after its provider record is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Key the item is provided under.
    pub key: ContentKey,
    /// Participant that announced the item.
    pub origin: PeerHandle,
}

impl ItemRecord {
    #[must_use]
    pub fn new(key: ContentKey, origin: PeerHandle) -> Self {
        Self { key, origin }
    }
}
