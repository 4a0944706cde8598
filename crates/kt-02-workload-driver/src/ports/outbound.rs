//! # Driven Ports (Outbound SPI)

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

use shared_types::{ContentKey, DhtError, PeerHandle};

/// Providers for one key; closes when exhausted or the limit is reached.
pub type ProviderStream = Pin<Box<dyn Stream<Item = PeerHandle> + Send>>;

/// Content routing capability of the local DHT node.
#[async_trait]
pub trait ContentRouting: Send + Sync {
    /// Store a provider record for `key`, pushing it to the network if
    /// `announce` is set.
    async fn provide(&self, key: &ContentKey, announce: bool) -> Result<(), DhtError>;

    /// Start a provider lookup yielding at most `limit` providers.
    async fn find_providers(
        &self,
        key: &ContentKey,
        limit: usize,
    ) -> Result<ProviderStream, DhtError>;
}

/// Read/prepare access to the hop table maintained alongside the DHT.
///
/// `begin_query` takes the write side, `provider_hops` the read side.
pub trait HopProbe: Send + Sync {
    /// Reset the table entry for `key` just before a lookup is issued.
    fn begin_query(&self, key: &ContentKey);

    /// Hops to the peer that returned the provider record, if recorded.
    fn provider_hops(&self, key: &ContentKey) -> Option<u32>;
}
