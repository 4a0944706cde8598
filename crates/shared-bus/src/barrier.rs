//! # Countable Barriers
//!
//! Each named state is a monotonically increasing counter. Signalling
//! increments it and returns the new value, which is the caller's arrival
//! rank; waiting blocks until the counter reaches a threshold.

use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::debug;

use shared_types::SequenceNumber;

use crate::RendezvousError;

/// Registry of named counters.
#[derive(Debug, Default)]
pub struct BarrierBoard {
    states: Mutex<HashMap<String, watch::Sender<u64>>>,
}

impl BarrierBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one arrival at `state` and return its 1-indexed rank.
    ///
    /// The increment and the read happen under one lock, so no two callers
    /// ever observe the same rank.
    pub fn signal(&self, state: &str) -> SequenceNumber {
        let mut states = self.states.lock();
        let sender = states
            .entry(state.to_string())
            .or_insert_with(|| watch::channel(0).0);
        let mut rank = 0;
        sender.send_modify(|count| {
            *count += 1;
            rank = *count;
        });
        debug!(state, rank, "Barrier signalled");
        rank
    }

    /// Wait until at least `target` arrivals have been recorded at `state`.
    pub async fn wait(&self, state: &str, target: u64) -> Result<(), RendezvousError> {
        let mut receiver = {
            let mut states = self.states.lock();
            states
                .entry(state.to_string())
                .or_insert_with(|| watch::channel(0).0)
                .subscribe()
        };
        receiver
            .wait_for(|count| *count >= target)
            .await
            .map(|_| ())
            .map_err(|_| RendezvousError::Closed)
    }

    /// Current number of arrivals at `state`.
    #[must_use]
    pub fn count(&self, state: &str) -> u64 {
        self.states
            .lock()
            .get(state)
            .map_or(0, |sender| *sender.borrow())
    }
}
