//! Cross-subsystem scenarios.

pub mod fault_flows;
pub mod fleet_flows;
pub mod hop_flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use node_runtime::ExperimentConfig;

    /// Fast, seeded configuration for an in-process fleet.
    pub fn fleet_config(participants: u64, items_to_find: u64) -> ExperimentConfig {
        ExperimentConfig {
            total_participants: participants,
            items_to_find,
            timeout_secs: 120,
            bootstrap_settle_ms: 100,
            quiesce_ms: 100,
            hop_settle_ms: 10,
            seed: Some(42),
            ..ExperimentConfig::default()
        }
    }
}
