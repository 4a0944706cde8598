//! Network environment and the combined DHT port.

use async_trait::async_trait;

use kt_01_bootstrap_sequencer::PeerConnector;
use kt_02_workload_driver::ContentRouting;
use kt_03_hop_counter::LookupEventSource;
use kt_04_result_reporter::RoutingTableProbe;
use shared_types::NetworkSetupError;

/// The network a participant runs in.
#[async_trait]
pub trait NetworkLayer: Send + Sync {
    /// Whether the network sidecar is present at all.
    fn sidecar_available(&self) -> bool;

    /// Resolve once the participant's network is configured.
    async fn wait_network_initialized(&self) -> Result<(), NetworkSetupError>;
}

/// Everything a participant needs from its DHT node.
pub trait DhtNode:
    PeerConnector + ContentRouting + LookupEventSource + RoutingTableProbe + 'static
{
}

impl<T> DhtNode for T where
    T: PeerConnector + ContentRouting + LookupEventSource + RoutingTableProbe + 'static
{
}
