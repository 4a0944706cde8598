//! # Bootstrap Target Selection
//!
//! Given every `ParticipantRecord` of the fleet and our own, decide whom we
//! dial. The result depends only on the set of records, never on the order
//! they arrived in.
//!
//! ## Single-root mode
//!
//! Sequence 1 is the root and dials nobody. Every other participant dials
//! the root, producing a star.
//!
//! ## Multi-cluster mode
//!
//! Sequence 1 is still the global root. A non-root participant dials the
//! smallest-sequence clustermate whose sequence is below its own; if it is
//! the first of its cluster it dials the global root instead. The root thus
//! bootstraps each cluster head and members hang off their head.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use shared_types::{ParticipantRecord, PeerId, SequenceNumber};

use super::errors::BootstrapError;

/// Topology the fleet bootstraps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapMode {
    /// Every participant dials the sequence-1 root.
    #[default]
    SingleRoot,
    /// Cluster heads dial the root, members dial their earliest clustermate.
    MultiCluster,
}

impl fmt::Display for BootstrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleRoot => write!(f, "single-root"),
            Self::MultiCluster => write!(f, "multi-cluster"),
        }
    }
}

/// What a participant does during the bootstrap phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapRole {
    /// Completes immediately without dialling anyone.
    Root,
    /// Dials `target` once every lower sequence has completed.
    Joiner { target: ParticipantRecord },
}

/// The outcome of target selection for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    /// Our own record.
    pub own: ParticipantRecord,
    /// Root or joiner.
    pub role: BootstrapRole,
    /// Peer ids observed in our cluster, ourselves included.
    pub local_peers: BTreeSet<PeerId>,
}

impl BootstrapPlan {
    #[must_use]
    pub fn sequence(&self) -> SequenceNumber {
        self.own.sequence
    }

    /// The record we dial, if any.
    #[must_use]
    pub fn target(&self) -> Option<&ParticipantRecord> {
        match &self.role {
            BootstrapRole::Root => None,
            BootstrapRole::Joiner { target } => Some(target),
        }
    }

    /// Completions required before we may dial.
    #[must_use]
    pub fn prior_completions(&self) -> u64 {
        self.own.sequence.saturating_sub(1)
    }
}

/// Select the bootstrap target for `own` among `observed`.
///
/// # Errors
///
/// - `BootstrapError::DuplicateSequence` if two records share a sequence
/// - `BootstrapError::MissingRoot` if nobody holds sequence 1
/// - `BootstrapError::OwnRecordMissing` if `own` is not in `observed`
pub fn plan_bootstrap(
    mode: BootstrapMode,
    own: &ParticipantRecord,
    observed: &[ParticipantRecord],
) -> Result<BootstrapPlan, BootstrapError> {
    let by_sequence = index_by_sequence(observed)?;
    let root = by_sequence
        .get(&1)
        .copied()
        .ok_or(BootstrapError::MissingRoot {
            observed: observed.len(),
        })?;
    if by_sequence.get(&own.sequence).map(|r| &r.peer) != Some(&own.peer) {
        return Err(BootstrapError::OwnRecordMissing(own.sequence));
    }

    let local_peers = observed
        .iter()
        .filter(|record| record.cluster == own.cluster)
        .map(|record| record.peer.id)
        .collect();

    let role = if own.is_root() {
        BootstrapRole::Root
    } else {
        let target = match mode {
            BootstrapMode::SingleRoot => root,
            BootstrapMode::MultiCluster => earliest_clustermate(own, observed).unwrap_or(root),
        };
        BootstrapRole::Joiner {
            target: target.clone(),
        }
    };

    Ok(BootstrapPlan {
        own: own.clone(),
        role,
        local_peers,
    })
}

/// Smallest-sequence clustermate that arrived before `own`.
fn earliest_clustermate<'a>(
    own: &ParticipantRecord,
    observed: &'a [ParticipantRecord],
) -> Option<&'a ParticipantRecord> {
    observed.iter().fold(None, |best: Option<&ParticipantRecord>, record| {
        let eligible = record.cluster == own.cluster && record.sequence < own.sequence;
        match best {
            _ if !eligible => best,
            Some(current) if current.sequence <= record.sequence => best,
            _ => Some(record),
        }
    })
}

fn index_by_sequence(
    observed: &[ParticipantRecord],
) -> Result<BTreeMap<SequenceNumber, &ParticipantRecord>, BootstrapError> {
    let mut index = BTreeMap::new();
    for record in observed {
        if index.insert(record.sequence, record).is_some() {
            return Err(BootstrapError::DuplicateSequence(record.sequence));
        }
    }
    Ok(index)
}

/// Every `(joiner, target)` sequence pair in the fleet, ordered by joiner.
///
/// # Errors
///
/// Same as [`plan_bootstrap`].
pub fn fleet_edges(
    mode: BootstrapMode,
    observed: &[ParticipantRecord],
) -> Result<Vec<(SequenceNumber, SequenceNumber)>, BootstrapError> {
    let mut edges = Vec::new();
    for own in observed {
        let plan = plan_bootstrap(mode, own, observed)?;
        if let Some(target) = plan.target() {
            edges.push((own.sequence, target.sequence));
        }
    }
    edges.sort_unstable();
    Ok(edges)
}
