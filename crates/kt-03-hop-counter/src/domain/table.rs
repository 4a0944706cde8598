//! # Hop Table
//!
//! Per content key, the hop distance from the querying node to every peer
//! it heard about during the lookup, plus a `provider` sentinel.
//!
//! ## Derivation
//!
//! For an event with a response:
//!
//! 1. every peer in `heard` that is not yet in the key's table gets
//!    `hops(cause) + 1`, or 1 when `cause` is not in the table (the cause
//!    is a peer we queried directly);
//! 2. if `queried` is non-empty and `heard` is empty, the queried peer
//!    answered with the record: `provider = hops(cause)`, or 0.
//!
//! Replaying the same ordered events always gives the same table.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use shared_types::{ContentKey, LookupEvent, PeerId};

/// Key of a per-query entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HopSubject {
    Peer(PeerId),
    /// The peer that returned the provider record.
    Provider,
}

/// What `HopTable::apply` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No query is being tracked for the event's key.
    Untracked,
    /// The event carried no response.
    NoResponse,
    Updated {
        /// Peers newly recorded.
        learned: usize,
        /// Provider hops, when this event identified the provider.
        provider: Option<u32>,
    },
}

/// Hop distances for every tracked key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopTable {
    keys: HashMap<ContentKey, HashMap<HopSubject, u32>>,
}

impl HopTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `key` with an empty entry, discarding any earlier one.
    pub fn begin_query(&mut self, key: &ContentKey) {
        self.keys.insert(*key, HashMap::new());
    }

    /// Fold one lookup event into the table.
    pub fn apply(&mut self, event: &LookupEvent) -> ApplyOutcome {
        let Some(entry) = self.keys.get_mut(&event.key) else {
            return ApplyOutcome::Untracked;
        };
        let Some(response) = &event.response else {
            return ApplyOutcome::NoResponse;
        };

        let cause = HopSubject::Peer(response.cause);
        let mut learned = 0;
        for peer in &response.heard {
            // The cause may itself be in `heard`; read it per peer.
            let cause_hops = entry.get(&cause).copied();
            if let Entry::Vacant(slot) = entry.entry(HopSubject::Peer(*peer)) {
                slot.insert(cause_hops.map_or(1, |hops| hops + 1));
                learned += 1;
            }
        }

        let provider = (!response.queried.is_empty() && response.heard.is_empty()).then(|| {
            let hops = entry.get(&cause).copied().unwrap_or(0);
            entry.insert(HopSubject::Provider, hops);
            hops
        });

        ApplyOutcome::Updated { learned, provider }
    }

    /// Hops to the provider for `key`, if the provider was identified.
    #[must_use]
    pub fn provider_hops(&self, key: &ContentKey) -> Option<u32> {
        self.keys.get(key)?.get(&HopSubject::Provider).copied()
    }

    /// Hops recorded for `peer` under `key`.
    #[must_use]
    pub fn peer_hops(&self, key: &ContentKey, peer: &PeerId) -> Option<u32> {
        self.keys.get(key)?.get(&HopSubject::Peer(*peer)).copied()
    }

    #[must_use]
    pub fn is_tracking(&self, key: &ContentKey) -> bool {
        self.keys.contains_key(key)
    }

    /// Entries recorded under `key`, the sentinel included.
    #[must_use]
    pub fn entry_len(&self, key: &ContentKey) -> usize {
        self.keys.get(key).map_or(0, HashMap::len)
    }
}
