//! # Workload Driver Service
//!
//! ```text
//! provide(own key) → publish(iteminfo) → collect N items
//!   │
//!   └─→ for each trial: pick item → begin_query → find_providers(limit 1)
//!          found  → settle → read hop table (absent = 0)
//!          missed → fail-fast stops, run-all continues
//! ```

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio_stream::StreamExt;
use tracing::{debug, info, instrument, warn};

use shared_bus::{RendezvousChannel, RendezvousExt, Topic};
use shared_types::{ContentKey, Deadline, ItemRecord, PeerHandle};

use crate::domain::errors::WorkloadError;
use crate::domain::tally::{DiscoveryTally, MissPolicy, TrialOutcome};
use crate::ports::outbound::{ContentRouting, HopProbe};

/// Topic carrying every participant's `ItemRecord`.
pub const ITEM_INFO_TOPIC: Topic<ItemRecord> = Topic::new("iteminfo");

/// Providers requested per trial.
const PROVIDER_LIMIT: usize = 1;

/// Workload configuration.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub total_participants: u64,
    pub items_to_find: u64,
    pub miss_policy: MissPolicy,
    /// Pause after a provider arrives so trailing lookup events land.
    pub hop_settle: Duration,
    /// Seed for trial selection; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            total_participants: 1,
            items_to_find: 10,
            miss_policy: MissPolicy::default(),
            hop_settle: Duration::from_secs(1),
            seed: None,
        }
    }
}

/// Drives the announce and discovery phases for one participant.
pub struct WorkloadDriver<R, D, H>
where
    R: RendezvousChannel + ?Sized,
    D: ContentRouting + ?Sized,
    H: HopProbe + ?Sized,
{
    rendezvous: Arc<R>,
    routing: Arc<D>,
    hops: Arc<H>,
    deadline: Deadline,
    config: WorkloadConfig,
}

impl<R, D, H> WorkloadDriver<R, D, H>
where
    R: RendezvousChannel + ?Sized,
    D: ContentRouting + ?Sized,
    H: HopProbe + ?Sized,
{
    pub fn new(
        rendezvous: Arc<R>,
        routing: Arc<D>,
        hops: Arc<H>,
        deadline: Deadline,
        config: WorkloadConfig,
    ) -> Self {
        Self {
            rendezvous,
            routing,
            hops,
            deadline,
            config,
        }
    }

    /// Announce our item, collect the fleet's, run the discovery trials.
    ///
    /// # Errors
    ///
    /// Provide or lookup failure, rendezvous failure, deadline expiry.
    #[instrument(skip_all, fields(peer = %origin.id.short()))]
    pub async fn run(&self, origin: &PeerHandle) -> Result<DiscoveryTally, WorkloadError> {
        let items = self.announce_and_collect(origin).await?;
        self.discover(&items).await
    }

    /// Provide our own key, broadcast it and wait for every participant's.
    pub async fn announce_and_collect(
        &self,
        origin: &PeerHandle,
    ) -> Result<Vec<ItemRecord>, WorkloadError> {
        let mut subscription = self.rendezvous.subscribe(&ITEM_INFO_TOPIC).await?;

        let key = ContentKey::for_peer(origin);
        self.deadline
            .guard("provide", self.routing.provide(&key, true))
            .await?
            .map_err(|source| WorkloadError::Provide { key, source })?;
        debug!(%key, "Provider record published");

        let own = ItemRecord::new(key, origin.clone());
        self.rendezvous.publish(&ITEM_INFO_TOPIC, &own).await?;

        let expected = usize::try_from(self.config.total_participants).unwrap_or(usize::MAX);
        let items = self
            .deadline
            .guard(ITEM_INFO_TOPIC.name(), subscription.collect(expected))
            .await??;
        info!(items = items.len(), "All items collected");
        Ok(items)
    }

    /// Run the configured number of trials over `items`.
    pub async fn discover(&self, items: &[ItemRecord]) -> Result<DiscoveryTally, WorkloadError> {
        if items.is_empty() {
            return Err(WorkloadError::NoItems);
        }
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut tally = DiscoveryTally::default();
        for trial in 0..self.config.items_to_find {
            let Some(item) = items.choose(&mut rng) else {
                break;
            };
            let outcome = self.run_trial(&item.key).await?;
            tally.record(&outcome);

            if let TrialOutcome::Found { provider, hops } = &outcome {
                debug!(trial, key = %item.key, provider = %provider.id.short(), hops, "Provider found");
                continue;
            }
            warn!(trial, key = %item.key, origin = %item.origin, "Provider not found");
            if self.config.miss_policy.stops_on_miss() {
                info!(
                    trial,
                    skipped = self.config.items_to_find - tally.trials,
                    "Abandoning remaining trials"
                );
                break;
            }
        }

        info!(
            found = tally.found,
            missed = tally.missed,
            hops_total = tally.hops_total,
            "Discovery complete"
        );
        Ok(tally)
    }

    /// One find-provider request for `key`.
    pub async fn run_trial(&self, key: &ContentKey) -> Result<TrialOutcome, WorkloadError> {
        self.hops.begin_query(key);

        let mut providers = self
            .deadline
            .guard("find-providers", self.routing.find_providers(key, PROVIDER_LIMIT))
            .await?
            .map_err(|source| WorkloadError::Lookup { key: *key, source })?;

        let Some(provider) = self.deadline.guard("find-providers", providers.next()).await? else {
            return Ok(TrialOutcome::Missed);
        };

        self.deadline.sleep("hop-settle", self.config.hop_settle).await?;
        let hops = self.hops.provider_hops(key).unwrap_or(0);
        Ok(TrialOutcome::Found { provider, hops })
    }
}
