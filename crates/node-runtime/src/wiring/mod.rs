//! # Participant Wiring
//!
//! Connects the subsystem services to the adapters and drives them through
//! the experiment phases.
//!
//! - [`participant`]: one participant, from network gate to final barrier
//! - [`fleet`]: many participants in one process over shared adapters

pub mod fleet;
pub mod participant;

pub use fleet::{participant_context, participant_identity, run_fleet, FleetReport};
pub use participant::{
    run_participant, ParticipantOutcome, ParticipantReport, EXPERIMENT_COMPLETED_STATE,
};
