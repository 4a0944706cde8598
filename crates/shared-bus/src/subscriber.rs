//! # Topic Subscriber
//!
//! Defines the receiving side of the rendezvous channel.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tokio::sync::mpsc;
use tracing::trace;

use crate::topic::Topic;
use crate::RendezvousError;

/// Untyped subscription: every payload published on the topic, once.
///
/// Backends feed the receiver with the topic history first and live
/// publications afterwards.
#[derive(Debug)]
pub struct RawSubscription {
    topic: String,
    receiver: mpsc::UnboundedReceiver<Value>,
}

impl RawSubscription {
    #[must_use]
    pub fn new(topic: impl Into<String>, receiver: mpsc::UnboundedReceiver<Value>) -> Self {
        Self {
            topic: topic.into(),
            receiver,
        }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next payload, or `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<Value> {
        self.receiver.recv().await
    }
}

/// Typed subscription handle for one topic.
#[derive(Debug)]
pub struct TopicSubscription<T> {
    raw: RawSubscription,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> TopicSubscription<T> {
    #[must_use]
    pub fn new(_topic: &Topic<T>, raw: RawSubscription) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Receive and decode the next value.
    ///
    /// # Errors
    ///
    /// - `RendezvousError::Closed` - the channel was dropped
    /// - `RendezvousError::Decode` - the payload is not a `T`
    pub async fn recv(&mut self) -> Result<T, RendezvousError> {
        let payload = self.raw.recv().await.ok_or(RendezvousError::Closed)?;
        trace!(topic = %self.raw.topic(), "Payload received");
        serde_json::from_value(payload).map_err(|e| RendezvousError::Decode {
            topic: self.raw.topic().to_string(),
            reason: e.to_string(),
        })
    }

    /// Block until exactly `count` values have arrived, in arrival order.
    pub async fn collect(&mut self, count: usize) -> Result<Vec<T>, RendezvousError> {
        let mut values = Vec::with_capacity(count);
        while values.len() < count {
            values.push(self.recv().await?);
        }
        Ok(values)
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        self.raw.topic()
    }
}
