//! # Node Runtime Library
//!
//! Orchestration of a Kad-Testbed participant. The binary in `main.rs` is a
//! thin CLI over [`wiring::run_fleet`]; the library is exposed so end-to-end
//! tests can run fleets in-process.
//!
//! ## Phase Sequence
//!
//! ```text
//! network gate ─→ bootstrap (kt-01) ─→ quiesce ─→ sample routing table
//!      │                                                  │
//!      │          hop instrumentor (kt-03), background    ↓
//!      │          ↑ lookup events        workload driver (kt-02)
//!      │                                                  │
//!      └─ no sidecar: abandon                             ↓
//!                                result reporter (kt-04) ─→ experiment-completed
//! ```
//!
//! ## Failure Taxonomy
//!
//! | Condition | Handling |
//! |-----------|----------|
//! | network, identity or config setup failure | `RunError`, fatal |
//! | deadline expiry on any blocking call | `RunError::Deadline`, fatal |
//! | bootstrap connect failure | warn log + metric, run continues |
//! | discovery miss | counted; ends the trials under `fail-fast` |

#![allow(clippy::module_name_repetitions)]

use thiserror::Error;

use kt_01_bootstrap_sequencer::BootstrapError;
use kt_02_workload_driver::WorkloadError;
use kt_03_hop_counter::HopCounterError;
use kt_04_result_reporter::RecordError;
use shared_bus::RendezvousError;
use shared_types::{DeadlineExceeded, NetworkSetupError};
use testbed_telemetry::TelemetryError;

pub mod adapters;
pub mod container;
pub mod wiring;

pub use container::{ConfigError, ExperimentCase, ExperimentConfig, ParticipantContext};
pub use wiring::{run_fleet, run_participant, FleetReport, ParticipantOutcome, ParticipantReport};

/// Fatal participant errors.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("network setup failed: {0}")]
    Network(#[from] NetworkSetupError),

    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("workload failed: {0}")]
    Workload(#[from] WorkloadError),

    #[error("hop instrumentor failed: {0}")]
    HopCounter(#[from] HopCounterError),

    #[error("result reporting failed: {0}")]
    Report(#[from] RecordError),

    #[error("rendezvous failed: {0}")]
    Rendezvous(#[from] RendezvousError),

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),

    #[error("telemetry setup failed: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("participant {index} task failed: {reason}")]
    Join { index: usize, reason: String },
}

impl RunError {
    /// Whether the run ended because the experiment deadline fired.
    #[must_use]
    pub fn is_deadline(&self) -> bool {
        matches!(
            self,
            Self::Deadline(_)
                | Self::Bootstrap(BootstrapError::Deadline(_))
                | Self::Workload(WorkloadError::Deadline(_))
        )
    }
}
