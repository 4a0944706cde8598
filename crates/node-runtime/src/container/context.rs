//! # Participant Context
//!
//! Single owner of a participant's run state. Threaded explicitly through
//! the orchestration; only the hop table is shared with the consumer task.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use kt_03_hop_counter::SharedHopTable;
use shared_types::{ClusterId, Deadline, LocalIdentity, PeerHandle, PeerId};
use testbed_telemetry::ExperimentMetrics;

use super::config::ExperimentConfig;

pub struct ParticipantContext {
    /// Position of the participant in its fleet (not its sequence number).
    pub index: usize,
    pub identity: LocalIdentity,
    pub handle: PeerHandle,
    pub cluster: ClusterId,
    pub config: Arc<ExperimentConfig>,
    pub deadline: Deadline,
    pub hop_table: SharedHopTable,
    pub metrics: ExperimentMetrics,
    /// Peers of our own cluster, filled in once bootstrap planning ran.
    pub local_peers: BTreeSet<PeerId>,
}

impl ParticipantContext {
    pub fn new(
        index: usize,
        identity: LocalIdentity,
        address: SocketAddr,
        config: Arc<ExperimentConfig>,
        deadline: Deadline,
        metrics: ExperimentMetrics,
    ) -> Self {
        let handle = identity.handle(vec![address]);
        let cluster = config.cluster_for(index);
        Self {
            index,
            identity,
            handle,
            cluster,
            config,
            deadline,
            hop_table: SharedHopTable::new(),
            metrics,
            local_peers: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn peer_id(&self) -> PeerId {
        self.handle.id
    }
}
