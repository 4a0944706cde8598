//! # Bootstrap Sequencer Service
//!
//! Runs the bootstrap phases of one participant against the rendezvous
//! channel and the local DHT node. Every blocking call is bounded by the
//! experiment deadline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use shared_bus::{RendezvousChannel, RendezvousExt, Topic};
use shared_types::{ClusterId, Deadline, DhtError, ParticipantRecord, PeerHandle, SequenceNumber};

use crate::domain::errors::BootstrapError;
use crate::domain::plan::{plan_bootstrap, BootstrapMode, BootstrapPlan};
use crate::ports::outbound::PeerConnector;

/// Every participant has a running DHT node; assigns sequence numbers.
pub const INIT_STATE: &str = "dht-init-completed";

/// Staggered per-participant bootstrap completion.
pub const BOOTSTRAP_STATE: &str = "bootstrap-completed";

/// The whole fleet has bootstrapped.
pub const FLEET_BOOTSTRAPPED_STATE: &str = "dht-bootstrap-completed";

/// Topic carrying every participant's `ParticipantRecord`.
pub const NODE_INFO_TOPIC: Topic<ParticipantRecord> = Topic::new("nodeinfo");

/// Sequencer configuration.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Expected fleet size.
    pub total_participants: u64,
    pub mode: BootstrapMode,
    /// Pause after dialling the target before signalling completion.
    pub settle: Duration,
}

impl SequencerConfig {
    #[must_use]
    pub fn new(total_participants: u64, mode: BootstrapMode) -> Self {
        Self {
            total_participants,
            mode,
            settle: Duration::from_secs(3),
        }
    }

    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// What happened during one participant's bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub plan: BootstrapPlan,
    /// Peer dialled, `None` for the root.
    pub target: Option<PeerHandle>,
    /// Set when the dial failed; the participant carried on regardless.
    pub connect_error: Option<DhtError>,
}

impl BootstrapOutcome {
    #[must_use]
    pub fn sequence(&self) -> SequenceNumber {
        self.plan.sequence()
    }

    /// True if this participant may be cut off from the fleet.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.connect_error.is_some()
    }
}

/// Drives one participant through the bootstrap phases.
pub struct BootstrapSequencer<R: RendezvousChannel + ?Sized, C: PeerConnector + ?Sized> {
    rendezvous: Arc<R>,
    connector: Arc<C>,
    deadline: Deadline,
    config: SequencerConfig,
}

impl<R, C> BootstrapSequencer<R, C>
where
    R: RendezvousChannel + ?Sized,
    C: PeerConnector + ?Sized,
{
    pub fn new(
        rendezvous: Arc<R>,
        connector: Arc<C>,
        deadline: Deadline,
        config: SequencerConfig,
    ) -> Self {
        Self {
            rendezvous,
            connector,
            deadline,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Full bootstrap: sequence, exchange, plan, join, fleet barrier.
    ///
    /// # Errors
    ///
    /// Deadline expiry, rendezvous failure or an inconsistent fleet view.
    /// A failed dial is NOT an error; see `BootstrapOutcome::connect_error`.
    #[instrument(skip_all, fields(peer = %handle.id.short(), cluster = %cluster))]
    pub async fn run(
        &self,
        handle: PeerHandle,
        cluster: ClusterId,
    ) -> Result<BootstrapOutcome, BootstrapError> {
        let sequence = self.assign_sequence().await?;
        let own = ParticipantRecord::new(handle, cluster, sequence);
        let observed = self.exchange_records(&own).await?;

        let plan = plan_bootstrap(self.config.mode, &own, &observed)?;
        self.connector.mark_local_peers(&plan.local_peers);
        debug!(
            seq = sequence,
            local_peers = plan.local_peers.len(),
            "Local peers marked"
        );

        let outcome = self.bootstrap(plan).await?;
        self.await_fleet().await?;
        Ok(outcome)
    }

    /// Signal `dht-init-completed` and wait for the fleet; returns our rank.
    pub async fn assign_sequence(&self) -> Result<SequenceNumber, BootstrapError> {
        let sequence = self
            .deadline
            .guard(
                INIT_STATE,
                self.rendezvous
                    .signal_and_wait(INIT_STATE, self.config.total_participants),
            )
            .await??;
        info!(seq = sequence, "Sequence number assigned");
        Ok(sequence)
    }

    /// Publish `own` and collect every participant's record, `own` included.
    pub async fn exchange_records(
        &self,
        own: &ParticipantRecord,
    ) -> Result<Vec<ParticipantRecord>, BootstrapError> {
        let mut subscription = self.rendezvous.subscribe(&NODE_INFO_TOPIC).await?;
        self.rendezvous.publish(&NODE_INFO_TOPIC, own).await?;

        let expected = usize::try_from(self.config.total_participants).unwrap_or(usize::MAX);
        let observed = self
            .deadline
            .guard(NODE_INFO_TOPIC.name(), subscription.collect(expected))
            .await??;
        debug!(seq = own.sequence, observed = observed.len(), "Fleet records collected");
        Ok(observed)
    }

    /// Join according to `plan`, staggered behind every lower sequence.
    pub async fn bootstrap(&self, plan: BootstrapPlan) -> Result<BootstrapOutcome, BootstrapError> {
        let sequence = plan.sequence();
        let Some(target) = plan.target().map(|record| record.peer.clone()) else {
            self.rendezvous.signal_entry(BOOTSTRAP_STATE).await?;
            info!(seq = sequence, "Root bootstrap complete");
            return Ok(BootstrapOutcome {
                plan,
                target: None,
                connect_error: None,
            });
        };

        self.deadline
            .guard(
                BOOTSTRAP_STATE,
                self.rendezvous
                    .barrier(BOOTSTRAP_STATE, plan.prior_completions()),
            )
            .await??;

        let connect_error = match self
            .deadline
            .guard("connect", self.connector.connect(&target))
            .await?
        {
            Ok(()) => {
                info!(seq = sequence, target = %target, "Connected to bootstrap target");
                None
            }
            Err(e) => {
                warn!(
                    seq = sequence,
                    target = %target,
                    error = %e,
                    "Bootstrap connect failed, continuing without target"
                );
                Some(e)
            }
        };

        self.deadline.sleep(BOOTSTRAP_STATE, self.config.settle).await?;
        self.rendezvous.signal_entry(BOOTSTRAP_STATE).await?;
        debug!(seq = sequence, "Bootstrap completion signalled");

        Ok(BootstrapOutcome {
            plan,
            target: Some(target),
            connect_error,
        })
    }

    /// Wait for every participant to finish bootstrapping.
    pub async fn await_fleet(&self) -> Result<(), BootstrapError> {
        self.deadline
            .guard(
                FLEET_BOOTSTRAPPED_STATE,
                self.rendezvous
                    .signal_and_wait(FLEET_BOOTSTRAPPED_STATE, self.config.total_participants),
            )
            .await??;
        info!("Fleet bootstrap complete");
        Ok(())
    }
}
