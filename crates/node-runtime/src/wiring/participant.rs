//! # Participant Run
//!
//! One participant's full sequence of phases. The hop instrumentor is the
//! only concurrent activity; it is started before bootstrap so that no
//! lookup event is missed, and it is always stopped and joined before the
//! run returns, on success and on error alike.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use kt_01_bootstrap_sequencer::BootstrapSequencer;
use kt_02_workload_driver::{DiscoveryTally, WorkloadDriver};
use kt_03_hop_counter::{HopInstrumentor, InstrumentorReport};
use kt_04_result_reporter::{AverageHops, ExperimentSummary, ResultReporter};
use shared_bus::RendezvousChannel;
use shared_types::{PeerId, SequenceNumber};
use testbed_telemetry::ExperimentMetrics;

use crate::adapters::{DhtNode, HopTableProbe, NetworkLayer, PrometheusRecorder};
use crate::container::ParticipantContext;
use crate::RunError;

/// Final barrier; nobody tears down while others still query.
pub const EXPERIMENT_COMPLETED_STATE: &str = "experiment-completed";

/// Results of a completed participant.
#[derive(Debug, Clone)]
pub struct ParticipantReport {
    pub index: usize,
    pub peer: PeerId,
    pub sequence: SequenceNumber,
    /// Peer we bootstrapped from; `None` for the root.
    pub target: Option<PeerId>,
    pub bootstrap_degraded: bool,
    pub tally: DiscoveryTally,
    pub summary: ExperimentSummary,
    pub average_hops: AverageHops,
    pub instrumentor: Option<InstrumentorReport>,
    pub metrics: ExperimentMetrics,
}

#[derive(Debug, Clone)]
pub enum ParticipantOutcome {
    Completed(Box<ParticipantReport>),
    /// No network sidecar; the participant did not run.
    Abandoned,
}

impl ParticipantOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&ParticipantReport> {
        match self {
            Self::Completed(report) => Some(report.as_ref()),
            Self::Abandoned => None,
        }
    }
}

/// Run every phase for the participant described by `ctx`.
///
/// # Errors
///
/// Any fatal condition; see [`RunError`]. Connect failures and discovery
/// misses are reported in the returned [`ParticipantReport`] instead.
#[instrument(skip_all, fields(index = ctx.index, peer = %ctx.peer_id().short(), cluster = %ctx.cluster))]
pub async fn run_participant<R, D, N>(
    mut ctx: ParticipantContext,
    rendezvous: Arc<R>,
    dht: Arc<D>,
    network: &N,
) -> Result<ParticipantOutcome, RunError>
where
    R: RendezvousChannel + ?Sized,
    D: DhtNode,
    N: NetworkLayer + ?Sized,
{
    if !network.sidecar_available() {
        warn!("No network sidecar available, abandoning");
        return Ok(ParticipantOutcome::Abandoned);
    }
    ctx.deadline
        .guard("network-init", network.wait_network_initialized())
        .await??;
    info!("Network initialised");

    let (stop, shutdown) = watch::channel(false);
    let instrumentor =
        HopInstrumentor::spawn(&*dht, ctx.hop_table.clone(), ctx.deadline, shutdown)?;

    let phases = run_phases(&mut ctx, &rendezvous, &dht).await;

    // The consumer may already have stopped on its own.
    let _ = stop.send(true);
    let joined = instrumentor.await.map_err(|err| RunError::Join {
        index: ctx.index,
        reason: err.to_string(),
    });

    let mut report = phases?;
    report.instrumentor = Some(joined?);
    Ok(ParticipantOutcome::Completed(Box::new(report)))
}

async fn run_phases<R, D>(
    ctx: &mut ParticipantContext,
    rendezvous: &Arc<R>,
    dht: &Arc<D>,
) -> Result<ParticipantReport, RunError>
where
    R: RendezvousChannel + ?Sized,
    D: DhtNode,
{
    let config = Arc::clone(&ctx.config);

    let sequencer = BootstrapSequencer::new(
        Arc::clone(rendezvous),
        Arc::clone(dht),
        ctx.deadline,
        config.sequencer(),
    );
    let bootstrap = sequencer
        .run(ctx.handle.clone(), ctx.cluster.clone())
        .await?;
    ctx.local_peers.clone_from(&bootstrap.plan.local_peers);
    let sequence = bootstrap.sequence();

    ctx.deadline.sleep("quiesce", config.quiesce()).await?;

    let reporter = ResultReporter::new(Arc::new(PrometheusRecorder::new(ctx.metrics.clone())));
    let routing_table_size = reporter.sample_routing_table(&**dht);

    let driver = WorkloadDriver::new(
        Arc::clone(rendezvous),
        Arc::clone(dht),
        Arc::new(HopTableProbe::new(ctx.hop_table.clone())),
        ctx.deadline,
        config.workload(sequence),
    );
    let tally = driver.run(&ctx.handle).await?;

    let summary = ExperimentSummary {
        routing_table_size,
        records_found: tally.found,
        records_missed: tally.missed,
        hops_total: tally.hops_total,
        connect_failures: u64::from(bootstrap.is_degraded()),
    };
    let average_hops = reporter.report(&summary)?;

    ctx.deadline
        .guard(
            EXPERIMENT_COMPLETED_STATE,
            rendezvous.signal_and_wait(EXPERIMENT_COMPLETED_STATE, config.total_participants),
        )
        .await??;
    info!(
        seq = sequence,
        found = tally.found,
        missed = tally.missed,
        hops = %average_hops,
        "Participant completed"
    );

    Ok(ParticipantReport {
        index: ctx.index,
        peer: ctx.peer_id(),
        sequence,
        target: bootstrap.target.as_ref().map(|target| target.id),
        bootstrap_degraded: bootstrap.is_degraded(),
        tally,
        summary,
        average_hops,
        instrumentor: None,
        metrics: ctx.metrics.clone(),
    })
}
