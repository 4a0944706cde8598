//! # Experiment Configuration
//!
//! Unified configuration for every subsystem of a participant.
//!
//! ## Validation
//!
//! - `total_participants` and `timeout_secs` MUST be non-zero
//! - the subnet MUST parse and hold one host per participant

use std::time::Duration;

use thiserror::Error;

use kt_01_bootstrap_sequencer::{BootstrapMode, SequencerConfig};
use kt_02_workload_driver::{MissPolicy, WorkloadConfig};
use shared_types::{ClusterId, NetworkSetupError, Subnet};

/// Preset experiment cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExperimentCase {
    /// Single-root star bootstrap.
    #[default]
    DhtCase,
    /// Multi-cluster bootstrap.
    MldhtCase,
}

impl ExperimentCase {
    #[must_use]
    pub fn bootstrap_mode(self) -> BootstrapMode {
        match self {
            Self::DhtCase => BootstrapMode::SingleRoot,
            Self::MldhtCase => BootstrapMode::MultiCluster,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DhtCase => "dht-case",
            Self::MldhtCase => "mldht-case",
        }
    }
}

/// Complete participant configuration.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub case: ExperimentCase,
    /// Discovery trials per participant.
    pub items_to_find: u64,
    /// Experiment-wide deadline.
    pub timeout_secs: u64,
    /// Cluster of a standalone participant; absent means the global cluster.
    pub cluster_id: Option<String>,
    /// Round-robin cluster assignment for in-process fleets.
    pub clusters: Vec<String>,
    /// Expected fleet size.
    pub total_participants: u64,
    pub miss_policy: MissPolicy,
    pub bootstrap_settle_ms: u64,
    pub quiesce_ms: u64,
    pub hop_settle_ms: u64,
    pub subnet: String,
    pub listen_port: u16,
    /// Seed for identities and trial selection.
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            case: ExperimentCase::default(),
            items_to_find: 10,
            timeout_secs: 300,
            cluster_id: None,
            clusters: Vec::new(),
            total_participants: 1,
            miss_policy: MissPolicy::default(),
            bootstrap_settle_ms: 3000,
            quiesce_ms: 2000,
            hop_settle_ms: 1000,
            subnet: "16.0.0.0/16".to_string(),
            listen_port: 4001,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Check the configuration before anything is started.
    ///
    /// # Errors
    ///
    /// See [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_participants == 0 {
            return Err(ConfigError::NoParticipants);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.clusters.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyClusterName);
        }
        let subnet = self.subnet()?;
        if subnet.capacity() < self.total_participants {
            return Err(ConfigError::SubnetTooSmall {
                subnet: self.subnet.clone(),
                participants: self.total_participants,
            });
        }
        Ok(())
    }

    /// Parsed subnet.
    ///
    /// # Errors
    ///
    /// `ConfigError::Network` if the subnet string is malformed.
    pub fn subnet(&self) -> Result<Subnet, ConfigError> {
        Ok(self.subnet.parse::<Subnet>()?)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn quiesce(&self) -> Duration {
        Duration::from_millis(self.quiesce_ms)
    }

    /// Cluster of participant `index`.
    #[must_use]
    pub fn cluster_for(&self, index: usize) -> ClusterId {
        if !self.clusters.is_empty() {
            return ClusterId::new(self.clusters[index % self.clusters.len()].clone());
        }
        self.cluster_id
            .as_ref()
            .map_or_else(ClusterId::global, ClusterId::new)
    }

    #[must_use]
    pub fn sequencer(&self) -> SequencerConfig {
        SequencerConfig::new(self.total_participants, self.case.bootstrap_mode())
            .with_settle(Duration::from_millis(self.bootstrap_settle_ms))
    }

    /// Workload configuration; the seed is offset per participant.
    #[must_use]
    pub fn workload(&self, salt: u64) -> WorkloadConfig {
        WorkloadConfig {
            total_participants: self.total_participants,
            items_to_find: self.items_to_find,
            miss_policy: self.miss_policy,
            hop_settle: Duration::from_millis(self.hop_settle_ms),
            seed: self.seed.map(|seed| seed.wrapping_add(salt)),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("total participants must be at least 1")]
    NoParticipants,

    #[error("timeout must be at least one second")]
    ZeroTimeout,

    #[error("cluster names must not be empty")]
    EmptyClusterName,

    #[error("subnet {subnet} cannot hold {participants} participants")]
    SubnetTooSmall { subnet: String, participants: u64 },

    #[error(transparent)]
    Network(#[from] NetworkSetupError),
}
