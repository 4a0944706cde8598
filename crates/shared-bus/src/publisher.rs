//! # Rendezvous Publisher
//!
//! Defines the `RendezvousChannel` trait and the in-memory implementation
//! used when a whole fleet runs inside one process.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

use shared_types::SequenceNumber;

use crate::barrier::BarrierBoard;
use crate::subscriber::{RawSubscription, TopicSubscription};
use crate::topic::Topic;
use crate::RendezvousError;

/// Trait for the rendezvous service every participant shares.
///
/// Implementations over a real coordination service (one per experiment
/// run) and the in-memory bus below satisfy the same contract.
#[async_trait]
pub trait RendezvousChannel: Send + Sync {
    /// Broadcast a payload to all current and future subscribers of `topic`.
    ///
    /// # Returns
    ///
    /// The number of payloads published on the topic so far, this one included.
    async fn publish_raw(&self, topic: &str, payload: Value) -> Result<u64, RendezvousError>;

    /// Subscribe to `topic`, replaying everything already published.
    async fn subscribe_raw(&self, topic: &str) -> Result<RawSubscription, RendezvousError>;

    /// Record arrival at `state` without waiting; returns the arrival rank.
    async fn signal_entry(&self, state: &str) -> Result<SequenceNumber, RendezvousError>;

    /// Block until `target` arrivals have been recorded at `state`.
    async fn barrier(&self, state: &str, target: u64) -> Result<(), RendezvousError>;

    /// Signal `state`, then wait for `target` arrivals.
    ///
    /// Every caller gets a distinct rank in `1..=target`.
    async fn signal_and_wait(
        &self,
        state: &str,
        target: u64,
    ) -> Result<SequenceNumber, RendezvousError> {
        let rank = self.signal_entry(state).await?;
        self.barrier(state, target).await?;
        Ok(rank)
    }
}

/// Typed helpers over any `RendezvousChannel`.
#[async_trait]
pub trait RendezvousExt: RendezvousChannel {
    /// Encode and publish `value` on `topic`.
    async fn publish<T>(&self, topic: &Topic<T>, value: &T) -> Result<u64, RendezvousError>
    where
        T: Serialize + Sync,
    {
        let payload = serde_json::to_value(value).map_err(|e| RendezvousError::Encode {
            topic: topic.name().to_string(),
            reason: e.to_string(),
        })?;
        self.publish_raw(topic.name(), payload).await
    }

    /// Subscribe to `topic` with a decoding handle.
    async fn subscribe<T>(&self, topic: &Topic<T>) -> Result<TopicSubscription<T>, RendezvousError>
    where
        T: DeserializeOwned + Send,
    {
        let raw = self.subscribe_raw(topic.name()).await?;
        Ok(TopicSubscription::new(topic, raw))
    }
}

impl<R: RendezvousChannel + ?Sized> RendezvousExt for R {}

#[derive(Debug, Default)]
struct TopicState {
    history: Vec<Value>,
    subscribers: Vec<mpsc::UnboundedSender<Value>>,
}

/// In-memory implementation of the rendezvous channel.
///
/// Topics keep their full history so late subscribers see every value.
/// Suitable for in-process fleets; distributed runs use a networked
/// implementation of the same trait.
#[derive(Debug, Default)]
pub struct InMemoryRendezvous {
    topics: Mutex<HashMap<String, TopicState>>,
    barriers: BarrierBoard,
    events_published: AtomicU64,
}

impl InMemoryRendezvous {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total payloads published across all topics.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Live subscribers of `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .get(topic)
            .map_or(0, |state| {
                state
                    .subscribers
                    .iter()
                    .filter(|tx| !tx.is_closed())
                    .count()
            })
    }

    /// Arrivals recorded so far at `state`.
    #[must_use]
    pub fn barrier_count(&self, state: &str) -> u64 {
        self.barriers.count(state)
    }
}

#[async_trait]
impl RendezvousChannel for InMemoryRendezvous {
    async fn publish_raw(&self, topic: &str, payload: Value) -> Result<u64, RendezvousError> {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let mut topics = self.topics.lock();
        let state = topics.entry(topic.to_string()).or_default();
        state
            .subscribers
            .retain(|tx| tx.send(payload.clone()).is_ok());
        state.history.push(payload);

        let published = state.history.len() as u64;
        debug!(
            topic,
            published,
            receivers = state.subscribers.len(),
            "Payload published"
        );
        Ok(published)
    }

    async fn subscribe_raw(&self, topic: &str) -> Result<RawSubscription, RendezvousError> {
        let (tx, rx) = mpsc::unbounded_channel();

        // History replay and registration share the lock: nothing published
        // concurrently can be missed or delivered twice.
        let mut topics = self.topics.lock();
        let state = topics.entry(topic.to_string()).or_default();
        for payload in &state.history {
            tx.send(payload.clone())
                .map_err(|_| RendezvousError::Closed)?;
        }
        state.subscribers.push(tx);

        debug!(topic, replayed = state.history.len(), "New subscription created");
        Ok(RawSubscription::new(topic, rx))
    }

    async fn signal_entry(&self, state: &str) -> Result<SequenceNumber, RendezvousError> {
        Ok(self.barriers.signal(state))
    }

    async fn barrier(&self, state: &str, target: u64) -> Result<(), RendezvousError> {
        self.barriers.wait(state, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const NUMBERS: Topic<u32> = Topic::new("numbers");

    #[tokio::test]
    async fn test_late_subscriber_sees_history() {
        let bus = InMemoryRendezvous::new();
        bus.publish(&NUMBERS, &1).await.unwrap();
        bus.publish(&NUMBERS, &2).await.unwrap();

        let mut sub = bus.subscribe(&NUMBERS).await.unwrap();
        bus.publish(&NUMBERS, &3).await.unwrap();

        assert_eq!(sub.collect(3).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(bus.events_published(), 3);
    }

    #[tokio::test]
    async fn test_each_subscriber_gets_every_value_once() {
        let bus = InMemoryRendezvous::new();
        let mut early = bus.subscribe(&NUMBERS).await.unwrap();
        bus.publish(&NUMBERS, &10).await.unwrap();
        let mut late = bus.subscribe(&NUMBERS).await.unwrap();
        bus.publish(&NUMBERS, &20).await.unwrap();

        assert_eq!(early.collect(2).await.unwrap(), vec![10, 20]);
        assert_eq!(late.collect(2).await.unwrap(), vec![10, 20]);
        assert_eq!(bus.subscriber_count("numbers"), 2);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let other: Topic<u32> = Topic::new("other");
        let bus = InMemoryRendezvous::new();
        bus.publish(&other, &99).await.unwrap();
        let mut sub = bus.subscribe(&NUMBERS).await.unwrap();
        bus.publish(&NUMBERS, &1).await.unwrap();
        assert_eq!(sub.recv().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let bus = InMemoryRendezvous::new();
        {
            let _sub = bus.subscribe(&NUMBERS).await.unwrap();
            assert_eq!(bus.subscriber_count("numbers"), 1);
        }
        assert_eq!(bus.subscriber_count("numbers"), 0);
        bus.publish(&NUMBERS, &1).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_signal_and_wait_assigns_one_to_n() {
        let bus = Arc::new(InMemoryRendezvous::new());
        let n = 16u64;
        let handles: Vec<_> = (0..n)
            .map(|_| {
                let bus = bus.clone();
                tokio::spawn(async move { bus.signal_and_wait("init", n).await })
            })
            .collect();

        let mut ranks = BTreeSet::new();
        for handle in handles {
            let rank = timeout(Duration::from_secs(5), handle)
                .await
                .expect("timeout")
                .expect("join")
                .expect("rank");
            assert!(ranks.insert(rank), "duplicate rank {rank}");
        }
        assert_eq!(ranks, (1..=n).collect::<BTreeSet<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_barrier_blocks_below_threshold() {
        let bus = InMemoryRendezvous::new();
        bus.signal_entry("done").await.unwrap();
        let blocked = timeout(Duration::from_secs(10), bus.barrier("done", 2)).await;
        assert!(blocked.is_err());

        bus.signal_entry("done").await.unwrap();
        bus.barrier("done", 2).await.unwrap();
        assert_eq!(bus.barrier_count("done"), 2);
    }
}
