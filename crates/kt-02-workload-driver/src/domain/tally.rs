//! # Discovery Tally
//!
//! Counts found and missed trials and accumulates provider hop counts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use shared_types::PeerHandle;

/// What the discovery loop does after a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissPolicy {
    /// Abandon the remaining trials.
    #[default]
    FailFast,
    /// Run every trial regardless.
    RunAll,
}

impl MissPolicy {
    #[must_use]
    pub fn stops_on_miss(self) -> bool {
        matches!(self, Self::FailFast)
    }
}

impl fmt::Display for MissPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::RunAll => write!(f, "run-all"),
        }
    }
}

impl FromStr for MissPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(Self::FailFast),
            "run-all" => Ok(Self::RunAll),
            other => Err(format!(
                "unknown miss policy '{other}' (expected fail-fast or run-all)"
            )),
        }
    }
}

/// Result of a single find-provider trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    /// A provider arrived before the result stream closed.
    Found { provider: PeerHandle, hops: u32 },
    /// The stream closed empty.
    Missed,
}

/// Running totals over the discovery phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryTally {
    /// Trials actually run; below the planned count after a fail-fast stop.
    pub trials: u64,
    pub found: u64,
    pub missed: u64,
    /// Sum of provider hop counts over found trials.
    pub hops_total: u64,
}

impl DiscoveryTally {
    pub fn record(&mut self, outcome: &TrialOutcome) {
        self.trials += 1;
        match outcome {
            TrialOutcome::Found { hops, .. } => {
                self.found += 1;
                self.hops_total += u64::from(*hops);
            }
            TrialOutcome::Missed => self.missed += 1,
        }
    }
}
