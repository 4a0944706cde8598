//! # In-Process Fleet
//!
//! Runs `total_participants` participants as tasks of one runtime, sharing
//! one `InMemoryRendezvous`, one `SimNetwork` and one experiment deadline.
//! Participant *i* gets host *i+1* of the configured subnet.

use std::net::SocketAddr;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{error, info, instrument};

use shared_bus::InMemoryRendezvous;
use shared_types::{Deadline, LocalIdentity, NetworkSetupError};
use testbed_telemetry::ExperimentMetrics;

use crate::adapters::SimNetwork;
use crate::container::{ExperimentConfig, ParticipantContext};
use crate::wiring::participant::{run_participant, ParticipantOutcome, ParticipantReport};
use crate::RunError;

/// Per-participant results, in participant index order.
#[derive(Debug)]
pub struct FleetReport {
    pub results: Vec<Result<ParticipantOutcome, RunError>>,
}

impl FleetReport {
    pub fn completed(&self) -> impl Iterator<Item = &ParticipantReport> {
        self.results
            .iter()
            .filter_map(|result| result.as_ref().ok().and_then(ParticipantOutcome::report))
    }

    #[must_use]
    pub fn abandoned(&self) -> usize {
        self.results
            .iter()
            .filter(|result| matches!(result, Ok(ParticipantOutcome::Abandoned)))
            .count()
    }

    #[must_use]
    pub fn first_error(&self) -> Option<&RunError> {
        self.results.iter().find_map(|result| result.as_ref().err())
    }
}

/// Identity of participant `index`, reproducible when a seed is set.
#[must_use]
pub fn participant_identity(seed: Option<u64>, index: usize) -> LocalIdentity {
    match seed {
        Some(seed) => {
            let mut hasher = Sha256::new();
            hasher.update(seed.to_le_bytes());
            hasher.update((index as u64).to_le_bytes());
            LocalIdentity::from_seed(hasher.finalize().into())
        }
        None => LocalIdentity::generate(),
    }
}

/// Build the context of participant `index`.
///
/// # Errors
///
/// Subnet exhaustion or metrics registration failure.
pub fn participant_context(
    config: &Arc<ExperimentConfig>,
    index: usize,
    deadline: Deadline,
) -> Result<ParticipantContext, RunError> {
    let host_index = u32::try_from(index).map_err(|_| NetworkSetupError::SubnetExhausted {
        subnet: config.subnet.clone(),
        index: u32::MAX,
    })?;
    let address = SocketAddr::new(config.subnet()?.host(host_index)?.into(), config.listen_port);
    Ok(ParticipantContext::new(
        index,
        participant_identity(config.seed, index),
        address,
        Arc::clone(config),
        deadline,
        ExperimentMetrics::new()?,
    ))
}

/// Run a whole fleet to completion.
///
/// # Errors
///
/// Invalid configuration or a failure while setting participants up.
/// Failures of individual runs are reported per participant.
#[instrument(skip_all, fields(case = config.case.name(), participants = config.total_participants))]
pub async fn run_fleet(
    config: ExperimentConfig,
    network: Arc<SimNetwork>,
) -> Result<FleetReport, RunError> {
    config.validate()?;
    let config = Arc::new(config);
    let deadline = Deadline::after(config.timeout());
    let rendezvous = Arc::new(InMemoryRendezvous::new());
    let count = usize::try_from(config.total_participants).unwrap_or(usize::MAX);

    let mut tasks = Vec::with_capacity(count);
    for index in 0..count {
        let ctx = participant_context(&config, index, deadline)?;
        let node = network.add_node(ctx.handle.clone());
        let rendezvous = Arc::clone(&rendezvous);
        let network = Arc::clone(&network);
        tasks.push(tokio::spawn(async move {
            run_participant(ctx, rendezvous, node, network.as_ref()).await
        }));
    }
    info!("Fleet started");

    let mut results = Vec::with_capacity(count);
    for (index, task) in tasks.into_iter().enumerate() {
        let result = task.await.unwrap_or_else(|err| {
            Err(RunError::Join {
                index,
                reason: err.to_string(),
            })
        });
        if let Err(err) = &result {
            error!(index, error = %err, "Participant failed");
        }
        results.push(result);
    }

    let report = FleetReport { results };
    info!(
        completed = report.completed().count(),
        abandoned = report.abandoned(),
        "Fleet finished"
    );
    Ok(report)
}
