//! # Workload Driver (KT-02)
//!
//! Announces one item per participant, waits until every participant's item
//! has been seen, then runs `items_to_find` discovery trials against
//! randomly chosen items.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): miss policy, trial outcomes and the tally
//! - **Ports Layer** (`ports/`): content routing and the hop-table probe
//! - **Service Layer** (`service.rs`): the announce and discovery phases
//!
//! ## Miss Policy
//!
//! | Policy | On first miss | Statistic |
//! |--------|---------------|-----------|
//! | `FailFast` | remaining trials abandoned | minimum found |
//! | `RunAll` | keep going | expected found rate |

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::WorkloadError;
pub use domain::tally::{DiscoveryTally, MissPolicy, TrialOutcome};
pub use ports::outbound::{ContentRouting, HopProbe, ProviderStream};
pub use service::{WorkloadConfig, WorkloadDriver, ITEM_INFO_TOPIC};
