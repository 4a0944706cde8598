//! # Driven Ports (Outbound SPI)

use std::pin::Pin;
use tokio_stream::Stream;

use shared_types::{DhtError, LookupEvent};

/// Lookup events in the order the DHT produced them.
pub type LookupEventStream = Pin<Box<dyn Stream<Item = LookupEvent> + Send>>;

/// Lookup instrumentation hook of the local DHT node.
pub trait LookupEventSource: Send + Sync {
    /// Hand out the node's event stream. There is one stream per node; a
    /// second registration fails with `DhtError::EventsAlreadyRegistered`.
    fn register_for_lookup_events(&self) -> Result<LookupEventStream, DhtError>;
}
