//! # Fault Flows
//!
//! Degraded and fatal runs:
//!
//! 1. **Dial failures**: non-fatal; participants run isolated and count misses
//! 2. **No sidecar**: every participant abandons and nobody fails
//! 3. **Network init failure**: fatal setup error
//! 4. **Missing participants**: the experiment deadline fires and is fatal

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kt_02_workload_driver::MissPolicy;
    use node_runtime::adapters::SimNetwork;
    use node_runtime::wiring::{participant_context, participant_identity};
    use node_runtime::{run_fleet, run_participant, ConfigError, ExperimentConfig, RunError};
    use shared_bus::InMemoryRendezvous;
    use shared_types::{Deadline, NetworkSetupError};

    use crate::integration::fixtures::fleet_config;

    // =========================================================================
    // NON-FATAL: BOOTSTRAP CONNECT FAILURES
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_failed_dials_degrade_but_complete() {
        let config = ExperimentConfig {
            miss_policy: MissPolicy::RunAll,
            ..fleet_config(4, 6)
        };
        let network = Arc::new(SimNetwork::new().with_all_dials_failing());
        let fleet = run_fleet(config, Arc::clone(&network)).await.unwrap();

        assert!(fleet.first_error().is_none());
        let reports: Vec<_> = fleet.completed().collect();
        assert_eq!(reports.len(), 4);
        assert_eq!(network.edge_count(), 0);

        for report in &reports {
            let joiner = report.sequence != 1;
            assert_eq!(report.bootstrap_degraded, joiner);
            assert_eq!(report.summary.connect_failures, u64::from(joiner));
            assert_eq!(report.metrics.connect_failures().get(), i64::from(joiner));
            assert_eq!(report.summary.routing_table_size, 0);

            // Only our own record is reachable.
            assert_eq!(report.tally.trials, 6);
            assert_eq!(report.tally.found + report.tally.missed, 6);
        }
        let missed: u64 = reports.iter().map(|r| r.tally.missed).sum();
        assert!(missed > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_stops_at_first_miss() {
        let config = ExperimentConfig {
            miss_policy: MissPolicy::FailFast,
            ..fleet_config(4, 10)
        };
        let network = Arc::new(SimNetwork::new().with_all_dials_failing());
        let fleet = run_fleet(config, network).await.unwrap();

        for report in fleet.completed() {
            assert!(report.tally.missed <= 1);
            assert_eq!(report.tally.trials, report.tally.found + report.tally.missed);
            assert!(report.tally.trials <= 10);
            if report.tally.missed == 0 {
                assert_eq!(report.tally.trials, 10);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_failing_dialer_degrades_only_itself() {
        let config = fleet_config(4, 4);
        let broken = participant_identity(config.seed, 2).peer_id();
        let network = Arc::new(SimNetwork::new());
        network.fail_dials_from(broken);
        let fleet = run_fleet(config, Arc::clone(&network)).await.unwrap();

        assert!(fleet.first_error().is_none());
        let reports: Vec<_> = fleet.completed().collect();
        assert_eq!(reports.len(), 4);

        let mut degraded = 0;
        for report in &reports {
            let expect = report.peer == broken && report.sequence != 1;
            assert_eq!(report.bootstrap_degraded, expect);
            degraded += usize::from(expect);
        }
        // Star on the root, minus the joiner that could not dial.
        assert_eq!(network.edge_count(), 3 - degraded);
    }

    // =========================================================================
    // ENVIRONMENT GATE
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_missing_sidecar_abandons_run() {
        let network = Arc::new(SimNetwork::new().without_sidecar());
        let fleet = run_fleet(fleet_config(3, 2), Arc::clone(&network))
            .await
            .unwrap();

        assert_eq!(fleet.abandoned(), 3);
        assert_eq!(fleet.completed().count(), 0);
        assert!(fleet.first_error().is_none());
        assert_eq!(network.edge_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_init_failure_is_fatal() {
        let network = Arc::new(SimNetwork::new().with_init_failure("overlay not ready"));
        let fleet = run_fleet(fleet_config(2, 2), network).await.unwrap();

        assert_eq!(fleet.results.len(), 2);
        for result in &fleet.results {
            assert!(matches!(
                result,
                Err(RunError::Network(NetworkSetupError::NotInitialized(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_start() {
        let config = ExperimentConfig {
            total_participants: 0,
            ..ExperimentConfig::default()
        };
        let err = run_fleet(config, Arc::new(SimNetwork::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::NoParticipants)));
    }

    // =========================================================================
    // FATAL: DEADLINE EXPIRY
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_missing_peer_expires_deadline() {
        // Two expected, one present: the first barrier never releases.
        let config = Arc::new(ExperimentConfig {
            timeout_secs: 5,
            ..fleet_config(2, 2)
        });
        let deadline = Deadline::after(config.timeout());
        let network = Arc::new(SimNetwork::new());
        let ctx = participant_context(&config, 0, deadline).unwrap();
        let node = network.add_node(ctx.handle.clone());

        let err = run_participant(
            ctx,
            Arc::new(InMemoryRendezvous::new()),
            node,
            network.as_ref(),
        )
        .await
        .unwrap_err();

        assert!(err.is_deadline(), "{err}");
    }
}
