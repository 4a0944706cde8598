//! # Lookup Events
//!
//! Produced by the DHT collaborator while a query walks the network and
//! consumed exactly once by the hop-counting instrumentor. Not persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{ContentKey, PeerId};

/// Identifier of one DHT query.
pub type QueryId = Uuid;

/// A progress update for one DHT query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEvent {
    /// Query this update belongs to.
    pub query_id: QueryId,
    /// Key being looked up.
    pub key: ContentKey,
    /// Present when the update reports a peer's answer.
    pub response: Option<LookupResponse>,
}

impl LookupEvent {
    #[must_use]
    pub fn new(query_id: QueryId, key: ContentKey, response: Option<LookupResponse>) -> Self {
        Self {
            query_id,
            key,
            response,
        }
    }
}

/// What one queried peer told us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Peer that sent the response.
    pub source: PeerId,
    /// Peer whose answer caused this update.
    pub cause: PeerId,
    /// Peers we learned about from the answer.
    pub heard: Vec<PeerId>,
    /// Peers that have now been queried.
    pub queried: Vec<PeerId>,
}
