//! # Simulated DHT
//!
//! In-process stand-in for the DHT collaborator, used to run and test a
//! whole fleet in one process. It is not Kademlia: routing tables are the
//! direct neighbours established by `connect`, and a lookup is a
//! breadth-first walk over neighbours in peer-id order.
//!
//! ## Lookup Events
//!
//! Every peer queried during a walk produces one event on the querying
//! node's stream, sent before the provider is yielded:
//!
//! ```text
//! source = cause = queried peer
//! queried = [queried peer]
//! heard   = its neighbours (without us), or [] if it holds the record
//! ```
//!
//! A record held locally is yielded without any events.
//!
//! ## Fault Injection
//!
//! Dials can be failed per dialer, per target, or globally; the network can
//! report a missing sidecar or a failed initialisation.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, trace};
use uuid::Uuid;

use kt_01_bootstrap_sequencer::PeerConnector;
use kt_02_workload_driver::{ContentRouting, ProviderStream};
use kt_03_hop_counter::{LookupEventSource, LookupEventStream};
use kt_04_result_reporter::RoutingTableProbe;
use shared_types::{
    ContentKey, DhtError, LookupEvent, LookupResponse, NetworkSetupError, PeerHandle, PeerId,
};

use super::network::NetworkLayer;

struct NodeState {
    handle: PeerHandle,
    neighbours: BTreeSet<PeerId>,
    records: HashMap<ContentKey, PeerHandle>,
    local_peers: BTreeSet<PeerId>,
    events: mpsc::UnboundedSender<LookupEvent>,
}

/// Shared state of every simulated node.
pub struct SimNetwork {
    nodes: RwLock<BTreeMap<PeerId, NodeState>>,
    failing_dialers: RwLock<HashSet<PeerId>>,
    refusing_targets: RwLock<HashSet<PeerId>>,
    fail_all_dials: AtomicBool,
    sidecar_available: bool,
    init_failure: Option<String>,
}

impl Default for SimNetwork {
    fn default() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            failing_dialers: RwLock::new(HashSet::new()),
            refusing_targets: RwLock::new(HashSet::new()),
            fail_all_dials: AtomicBool::new(false),
            sidecar_available: true,
            init_failure: None,
        }
    }
}

impl SimNetwork {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that no network sidecar is present.
    #[must_use]
    pub fn without_sidecar(mut self) -> Self {
        self.sidecar_available = false;
        self
    }

    /// Make network initialisation fail with `reason`.
    #[must_use]
    pub fn with_init_failure(mut self, reason: impl Into<String>) -> Self {
        self.init_failure = Some(reason.into());
        self
    }

    /// Fail every dial.
    #[must_use]
    pub fn with_all_dials_failing(self) -> Self {
        self.fail_all_dials.store(true, Ordering::Relaxed);
        self
    }

    /// Dials issued by `dialer` fail.
    pub fn fail_dials_from(&self, dialer: PeerId) {
        self.failing_dialers.write().insert(dialer);
    }

    /// Dials towards `target` fail.
    pub fn refuse_dials_to(&self, target: PeerId) {
        self.refusing_targets.write().insert(target);
    }

    /// Create a node for `handle`.
    pub fn add_node(self: &Arc<Self>, handle: PeerHandle) -> Arc<SimNode> {
        let (events, receiver) = mpsc::unbounded_channel();
        let id = handle.id;
        self.nodes.write().insert(
            id,
            NodeState {
                handle,
                neighbours: BTreeSet::new(),
                records: HashMap::new(),
                local_peers: BTreeSet::new(),
                events,
            },
        );
        debug!(peer = %id.short(), "Simulated node added");
        Arc::new(SimNode {
            id,
            network: Arc::clone(self),
            receiver: Mutex::new(Some(receiver)),
        })
    }

    /// Direct neighbours of `peer`.
    #[must_use]
    pub fn neighbours(&self, peer: &PeerId) -> BTreeSet<PeerId> {
        self.nodes
            .read()
            .get(peer)
            .map(|state| state.neighbours.clone())
            .unwrap_or_default()
    }

    /// Local-peer set the node was told about.
    #[must_use]
    pub fn local_peers(&self, peer: &PeerId) -> BTreeSet<PeerId> {
        self.nodes
            .read()
            .get(peer)
            .map(|state| state.local_peers.clone())
            .unwrap_or_default()
    }

    /// Undirected neighbour edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let total: usize = self
            .nodes
            .read()
            .values()
            .map(|state| state.neighbours.len())
            .sum();
        total / 2
    }

    fn dial_fails(&self, dialer: &PeerId, target: &PeerId) -> bool {
        self.fail_all_dials.load(Ordering::Relaxed)
            || self.failing_dialers.read().contains(dialer)
            || self.refusing_targets.read().contains(target)
    }

    fn connect(&self, dialer: PeerId, target: &PeerHandle) -> Result<(), DhtError> {
        let refused = |reason: &str| DhtError::ConnectFailed {
            peer: target.id,
            reason: reason.to_string(),
        };
        if dialer == target.id {
            return Err(refused("cannot dial self"));
        }
        if self.dial_fails(&dialer, &target.id) {
            return Err(refused("connection refused"));
        }

        let mut nodes = self.nodes.write();
        if !nodes.contains_key(&target.id) {
            return Err(refused("no route to peer"));
        }
        for (from, to) in [(dialer, target.id), (target.id, dialer)] {
            let state = nodes
                .get_mut(&from)
                .ok_or_else(|| DhtError::Unavailable(format!("node {} is gone", from.short())))?;
            state.neighbours.insert(to);
        }
        Ok(())
    }

    fn provide(&self, origin: PeerId, key: &ContentKey, announce: bool) -> Result<(), DhtError> {
        let mut nodes = self.nodes.write();
        let state = nodes
            .get_mut(&origin)
            .ok_or_else(|| DhtError::Unavailable(format!("node {} is gone", origin.short())))?;
        let provider = state.handle.clone();
        state.records.insert(*key, provider.clone());
        if !announce {
            return Ok(());
        }

        let neighbours: Vec<PeerId> = state.neighbours.iter().copied().collect();
        for peer in &neighbours {
            if let Some(neighbour) = nodes.get_mut(peer) {
                neighbour.records.insert(*key, provider.clone());
            }
        }
        trace!(%key, stored_at = neighbours.len(), "Provider record announced");
        Ok(())
    }

    fn lookup(
        &self,
        origin: PeerId,
        key: &ContentKey,
        limit: usize,
    ) -> Result<Vec<PeerHandle>, DhtError> {
        let nodes = self.nodes.read();
        let me = nodes
            .get(&origin)
            .ok_or_else(|| DhtError::Unavailable(format!("node {} is gone", origin.short())))?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        if let Some(provider) = me.records.get(key) {
            return Ok(vec![provider.clone()]);
        }

        let query_id = Uuid::new_v4();
        let emit = |peer: PeerId, heard: Vec<PeerId>| {
            let response = LookupResponse {
                source: peer,
                cause: peer,
                heard,
                queried: vec![peer],
            };
            // A node nobody listens to just drops its events.
            let _ = me
                .events
                .send(LookupEvent::new(query_id, *key, Some(response)));
        };

        let mut visited: HashSet<PeerId> = HashSet::from([origin]);
        let mut queue: VecDeque<PeerId> = me
            .neighbours
            .iter()
            .copied()
            .filter(|peer| visited.insert(*peer))
            .collect();
        let mut providers: Vec<PeerHandle> = Vec::new();

        while let Some(peer) = queue.pop_front() {
            let Some(state) = nodes.get(&peer) else {
                continue;
            };
            if let Some(provider) = state.records.get(key) {
                emit(peer, Vec::new());
                if !providers.iter().any(|p| p.id == provider.id) {
                    providers.push(provider.clone());
                }
                if providers.len() >= limit {
                    break;
                }
                continue;
            }

            let heard: Vec<PeerId> = state
                .neighbours
                .iter()
                .copied()
                .filter(|n| *n != origin)
                .collect();
            queue.extend(heard.iter().copied().filter(|n| visited.insert(*n)));
            emit(peer, heard);
        }

        trace!(%key, query = %query_id, providers = providers.len(), "Lookup walk finished");
        Ok(providers)
    }
}

#[async_trait]
impl NetworkLayer for SimNetwork {
    fn sidecar_available(&self) -> bool {
        self.sidecar_available
    }

    async fn wait_network_initialized(&self) -> Result<(), NetworkSetupError> {
        match &self.init_failure {
            Some(reason) => Err(NetworkSetupError::NotInitialized(reason.clone())),
            None => Ok(()),
        }
    }
}

/// One participant's view of the simulated DHT.
pub struct SimNode {
    id: PeerId,
    network: Arc<SimNetwork>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<LookupEvent>>>,
}

impl SimNode {
    #[must_use]
    pub fn id(&self) -> PeerId {
        self.id
    }
}

#[async_trait]
impl PeerConnector for SimNode {
    async fn connect(&self, peer: &PeerHandle) -> Result<(), DhtError> {
        self.network.connect(self.id, peer)
    }

    fn mark_local_peers(&self, peers: &BTreeSet<PeerId>) {
        if let Some(state) = self.network.nodes.write().get_mut(&self.id) {
            state.local_peers.clone_from(peers);
        }
    }
}

#[async_trait]
impl ContentRouting for SimNode {
    async fn provide(&self, key: &ContentKey, announce: bool) -> Result<(), DhtError> {
        self.network.provide(self.id, key, announce)
    }

    async fn find_providers(
        &self,
        key: &ContentKey,
        limit: usize,
    ) -> Result<ProviderStream, DhtError> {
        let providers = self.network.lookup(self.id, key, limit)?;
        Ok(Box::pin(tokio_stream::iter(providers)))
    }
}

impl LookupEventSource for SimNode {
    fn register_for_lookup_events(&self) -> Result<LookupEventStream, DhtError> {
        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or(DhtError::EventsAlreadyRegistered)?;
        Ok(Box::pin(UnboundedReceiverStream::new(receiver)))
    }
}

impl RoutingTableProbe for SimNode {
    fn routing_table_size(&self) -> usize {
        self.network.neighbours(&self.id).len()
    }
}
