//! # Participant Container
//!
//! Configuration and the per-run context object every phase is handed.
//! There are no process-wide singletons: a fleet running in one process
//! builds one `ParticipantContext` per participant.

pub mod config;
pub mod context;

pub use config::{ConfigError, ExperimentCase, ExperimentConfig};
pub use context::ParticipantContext;
