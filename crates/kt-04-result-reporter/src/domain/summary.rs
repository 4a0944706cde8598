//! # Experiment Summary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything one participant reports at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub routing_table_size: u64,
    pub records_found: u64,
    pub records_missed: u64,
    /// Sum of provider hop counts over found trials.
    pub hops_total: u64,
    pub connect_failures: u64,
}

impl ExperimentSummary {
    #[must_use]
    pub fn average_hops(&self) -> AverageHops {
        AverageHops::over(self.hops_total, self.records_found)
    }
}

/// Mean provider hops, undefined when nothing was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageHops {
    Defined(f64),
    Undefined,
}

impl AverageHops {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over(hops_total: u64, found: u64) -> Self {
        if found == 0 {
            return Self::Undefined;
        }
        Self::Defined(hops_total as f64 / found as f64)
    }

    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(v),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for AverageHops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(v) => write!(f, "{v:.2}"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}
