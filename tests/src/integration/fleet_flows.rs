//! # Fleet Flows
//!
//! Whole experiments in one process: every participant runs the full phase
//! sequence over one `InMemoryRendezvous` and one `SimNetwork`.
//!
//! | Case | Topology | Expectation |
//! |------|----------|-------------|
//! | `dht-case`, 4 nodes | star on seq 1 | every trial found, zero hops |
//! | `mldht-case`, 2 x 3 nodes | two-level tree | 5 edges, in-cluster targets |

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use kt_03_hop_counter::InstrumentorExit;
    use kt_04_result_reporter::AverageHops;
    use node_runtime::adapters::SimNetwork;
    use node_runtime::{run_fleet, ExperimentCase, FleetReport, ParticipantReport};

    use crate::integration::fixtures::fleet_config;

    fn reports(report: &FleetReport) -> Vec<&ParticipantReport> {
        assert!(report.first_error().is_none(), "{:?}", report.first_error());
        report.completed().collect()
    }

    fn sequences(reports: &[&ParticipantReport]) -> BTreeSet<u64> {
        reports.iter().map(|r| r.sequence).collect()
    }

    // =========================================================================
    // DHT CASE: SINGLE ROOT
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_dht_case_finds_every_item() {
        let network = Arc::new(SimNetwork::new());
        let fleet = run_fleet(fleet_config(4, 4), Arc::clone(&network))
            .await
            .unwrap();
        let reports = reports(&fleet);

        assert_eq!(reports.len(), 4);
        assert_eq!(sequences(&reports), (1..=4).collect());
        for report in &reports {
            assert_eq!(report.tally.trials, 4);
            assert_eq!(report.summary.records_found, 4);
            assert_eq!(report.summary.records_missed, 0);
            assert_eq!(report.summary.connect_failures, 0);
            assert_eq!(report.metrics.records_found().get(), 4);
            assert_eq!(report.metrics.records_missed().get(), 0);
        }
        assert_eq!(network.edge_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dht_case_builds_star_on_root() {
        let network = Arc::new(SimNetwork::new());
        let fleet = run_fleet(fleet_config(4, 2), Arc::clone(&network))
            .await
            .unwrap();
        let reports = reports(&fleet);

        let root = reports.iter().find(|r| r.sequence == 1).unwrap();
        assert_eq!(root.target, None);
        assert_eq!(root.summary.routing_table_size, 3);
        assert_eq!(network.neighbours(&root.peer).len(), 3);

        for joiner in reports.iter().filter(|r| r.sequence != 1) {
            assert_eq!(joiner.target, Some(root.peer));
            assert_eq!(joiner.summary.routing_table_size, 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_star_lookups_take_zero_hops() {
        let fleet = run_fleet(fleet_config(4, 8), Arc::new(SimNetwork::new()))
            .await
            .unwrap();

        // The root holds every record and is every joiner's direct neighbour.
        for report in reports(&fleet) {
            assert_eq!(report.tally.hops_total, 0);
            assert_eq!(report.average_hops, AverageHops::Defined(0.0));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_trials_report_undefined_average() {
        let fleet = run_fleet(fleet_config(2, 0), Arc::new(SimNetwork::new()))
            .await
            .unwrap();

        for report in reports(&fleet) {
            assert_eq!(report.tally.trials, 0);
            assert_eq!(report.average_hops, AverageHops::Undefined);
            assert_eq!(report.metrics.hops_to_provider(), None);
            let exported = report.metrics.encode().unwrap();
            assert!(
                !exported.lines().any(|line| line.starts_with("kt_hops_to_provider")),
                "undefined average exported: {exported}"
            );
        }
    }

    // =========================================================================
    // MLDHT CASE: TWO CLUSTERS OF THREE
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_mldht_case_spans_fleet_with_five_edges() {
        let config = node_runtime::ExperimentConfig {
            case: ExperimentCase::MldhtCase,
            clusters: vec!["a".into(), "b".into()],
            ..fleet_config(6, 6)
        };
        let clusters: Vec<_> = (0..6).map(|i| config.cluster_for(i)).collect();
        let network = Arc::new(SimNetwork::new());
        let fleet = run_fleet(config, Arc::clone(&network)).await.unwrap();
        let reports = reports(&fleet);

        assert_eq!(sequences(&reports), (1..=6).collect());
        assert_eq!(network.edge_count(), 5);

        let root = reports.iter().find(|r| r.sequence == 1).unwrap();
        assert_eq!(root.target, None);

        for joiner in reports.iter().filter(|r| r.sequence != 1) {
            let earliest_mate = reports
                .iter()
                .filter(|r| clusters[r.index] == clusters[joiner.index])
                .filter(|r| r.sequence < joiner.sequence)
                .min_by_key(|r| r.sequence);
            let expected = earliest_mate.map_or(root.peer, |mate| mate.peer);
            assert_eq!(joiner.target, Some(expected), "seq {}", joiner.sequence);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mldht_case_finds_across_clusters() {
        let config = node_runtime::ExperimentConfig {
            case: ExperimentCase::MldhtCase,
            clusters: vec!["a".into(), "b".into()],
            ..fleet_config(6, 6)
        };
        let fleet = run_fleet(config, Arc::new(SimNetwork::new())).await.unwrap();

        for report in reports(&fleet) {
            assert_eq!(report.summary.records_found, 6);
            assert_eq!(report.summary.records_missed, 0);
            let instrumentor = report.instrumentor.unwrap();
            assert_eq!(instrumentor.exit, InstrumentorExit::Cancelled);
            assert!(instrumentor.events_applied <= instrumentor.events_seen);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fleet_reports_local_peers_to_dht() {
        let config = node_runtime::ExperimentConfig {
            case: ExperimentCase::MldhtCase,
            clusters: vec!["a".into(), "b".into()],
            ..fleet_config(4, 1)
        };
        let clusters: Vec<_> = (0..4).map(|i| config.cluster_for(i)).collect();
        let network = Arc::new(SimNetwork::new());
        let fleet = run_fleet(config, Arc::clone(&network)).await.unwrap();
        let reports = reports(&fleet);

        for report in &reports {
            let expected: BTreeSet<_> = reports
                .iter()
                .filter(|r| clusters[r.index] == clusters[report.index])
                .map(|r| r.peer)
                .collect();
            assert_eq!(network.local_peers(&report.peer), expected);
        }
    }
}
