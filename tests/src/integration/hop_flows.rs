//! # Hop Flows
//!
//! Simulated DHT lookups feeding the hop instrumentor while the workload
//! driver reads the provider distance:
//!
//! ```text
//! SimNode::find_providers ──LookupEvent──→ HopInstrumentor ──→ SharedHopTable
//!          ↑                                                        │
//!          └────────────── WorkloadDriver::run_trial ←── provider_hops
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::watch;

    use kt_01_bootstrap_sequencer::PeerConnector;
    use kt_02_workload_driver::{
        ContentRouting, MissPolicy, TrialOutcome, WorkloadConfig, WorkloadDriver,
    };
    use kt_03_hop_counter::{HopInstrumentor, InstrumentorExit, SharedHopTable};
    use node_runtime::adapters::{HopTableProbe, SimNetwork, SimNode};
    use shared_bus::InMemoryRendezvous;
    use shared_types::{ContentKey, Deadline, ItemRecord, PeerHandle, PeerId};

    fn handle(i: u8) -> PeerHandle {
        PeerHandle::new(PeerId([i; 32]), vec![])
    }

    /// 1 - 2 - 3 - 4 - 5
    async fn chain() -> Vec<Arc<SimNode>> {
        let network = Arc::new(SimNetwork::new());
        let nodes: Vec<_> = (1..=5).map(|i| network.add_node(handle(i))).collect();
        for (i, node) in nodes.iter().enumerate().skip(1) {
            let previous = u8::try_from(i).unwrap();
            node.connect(&handle(previous)).await.unwrap();
        }
        nodes
    }

    fn driver(
        node: &Arc<SimNode>,
        table: &SharedHopTable,
        deadline: Deadline,
    ) -> WorkloadDriver<InMemoryRendezvous, SimNode, HopTableProbe> {
        WorkloadDriver::new(
            Arc::new(InMemoryRendezvous::new()),
            Arc::clone(node),
            Arc::new(HopTableProbe::new(table.clone())),
            deadline,
            WorkloadConfig {
                total_participants: 1,
                items_to_find: 1,
                miss_policy: MissPolicy::RunAll,
                hop_settle: Duration::from_millis(10),
                seed: Some(1),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_hops_follow_walk() {
        let nodes = chain().await;
        let key = ContentKey::for_peer(&handle(5));
        // Stored at 5 and announced to 4.
        nodes[4].provide(&key, true).await.unwrap();

        let table = SharedHopTable::new();
        let deadline = Deadline::after(Duration::from_secs(60));
        let (stop, shutdown) = watch::channel(false);
        let consumer =
            HopInstrumentor::spawn(&*nodes[0], table.clone(), deadline, shutdown).unwrap();

        let outcome = driver(&nodes[0], &table, deadline)
            .run_trial(&key)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TrialOutcome::Found {
                provider: handle(5),
                hops: 2
            }
        );
        assert_eq!(table.read(|t| t.peer_hops(&key, &handle(3).id)), Some(1));
        assert_eq!(table.read(|t| t.peer_hops(&key, &handle(4).id)), Some(2));

        stop.send(true).unwrap();
        let report = consumer.await.unwrap();
        assert_eq!(report.exit, InstrumentorExit::Cancelled);
        assert_eq!(report.events_seen, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_locally_held_record_is_zero_hops() {
        let nodes = chain().await;
        let key = ContentKey::for_peer(&handle(5));
        nodes[4].provide(&key, true).await.unwrap();

        let table = SharedHopTable::new();
        let deadline = Deadline::after(Duration::from_secs(60));
        let (stop, shutdown) = watch::channel(false);
        let consumer =
            HopInstrumentor::spawn(&*nodes[3], table.clone(), deadline, shutdown).unwrap();

        let tally = driver(&nodes[3], &table, deadline)
            .discover(&[ItemRecord::new(key, handle(5))])
            .await
            .unwrap();
        assert_eq!(tally.found, 1);
        assert_eq!(tally.hops_total, 0);
        assert_eq!(table.provider_hops(&key), None);

        stop.send(true).unwrap();
        assert_eq!(consumer.await.unwrap().events_seen, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_record_is_a_miss() {
        let network = Arc::new(SimNetwork::new());
        let lonely = network.add_node(handle(1));
        let holder = network.add_node(handle(2));
        let key = ContentKey::for_peer(&handle(2));
        holder.provide(&key, true).await.unwrap();

        let table = SharedHopTable::new();
        let deadline = Deadline::after(Duration::from_secs(60));
        let outcome = driver(&lonely, &table, deadline)
            .run_trial(&key)
            .await
            .unwrap();
        assert_eq!(outcome, TrialOutcome::Missed);
    }
}
