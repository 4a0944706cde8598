//! # Kad-Testbed Node Runtime
//!
//! Runs a fleet of experiment participants in one process over the in-memory
//! rendezvous channel and the simulated DHT, then exits non-zero if any
//! participant hit a fatal error.
//!
//! ```text
//! node-runtime --case dht-case   --participants 4 --items-to-find 4
//! node-runtime --case mldht-case --participants 6 --clusters a,b
//! ```

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, info};

use kt_02_workload_driver::MissPolicy;
use node_runtime::adapters::SimNetwork;
use node_runtime::{run_fleet, ExperimentCase, ExperimentConfig};
use testbed_telemetry::{init_telemetry, TelemetryConfig};

/// Kad-Testbed experiment participant fleet
#[derive(Parser, Debug)]
#[command(name = "node-runtime")]
#[command(about = "Runs a DHT lookup experiment over a simulated fleet")]
struct Args {
    /// Experiment preset
    #[arg(long, env = "KT_CASE", value_enum, default_value_t = ExperimentCase::DhtCase)]
    case: ExperimentCase,

    /// Discovery trials per participant
    #[arg(long, env = "KT_ITEMS_TO_FIND", default_value_t = 10)]
    items_to_find: u64,

    /// Experiment-wide deadline in seconds
    #[arg(long, env = "KT_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    /// Cluster of every participant, when --clusters is not given
    #[arg(long, env = "KT_CLUSTER_ID")]
    cluster_id: Option<String>,

    /// Round-robin cluster assignment, e.g. `a,b`
    #[arg(long, env = "KT_CLUSTERS", value_delimiter = ',')]
    clusters: Vec<String>,

    /// Fleet size
    #[arg(long, env = "TEST_INSTANCE_COUNT", default_value_t = 1)]
    participants: u64,

    /// `fail-fast` or `run-all`
    #[arg(long, env = "KT_MISS_POLICY", default_value_t = MissPolicy::FailFast)]
    miss_policy: MissPolicy,

    /// Pause after a bootstrap connect, in milliseconds
    #[arg(long, env = "KT_BOOTSTRAP_SETTLE_MS", default_value_t = 3000)]
    bootstrap_settle_ms: u64,

    /// Pause after the fleet-wide bootstrap barrier, in milliseconds
    #[arg(long, env = "KT_QUIESCE_MS", default_value_t = 2000)]
    quiesce_ms: u64,

    /// Pause between a found provider and reading its hops, in milliseconds
    #[arg(long, env = "KT_HOP_SETTLE_MS", default_value_t = 1000)]
    hop_settle_ms: u64,

    /// IPv4 subnet participants take their addresses from
    #[arg(long, env = "KT_SUBNET", default_value = "16.0.0.0/16")]
    subnet: String,

    /// Listen port advertised in peer handles
    #[arg(long, env = "KT_LISTEN_PORT", default_value_t = 4001)]
    port: u16,

    /// Seed for identities and trial selection
    #[arg(long, env = "KT_SEED")]
    seed: Option<u64>,

    /// Whether a network sidecar is present
    #[arg(long, env = "TEST_SIDECAR", default_value_t = true, action = ArgAction::Set)]
    sidecar: bool,
}

impl Args {
    fn config(&self) -> ExperimentConfig {
        ExperimentConfig {
            case: self.case,
            items_to_find: self.items_to_find,
            timeout_secs: self.timeout_secs,
            cluster_id: self.cluster_id.clone(),
            clusters: self.clusters.clone(),
            total_participants: self.participants,
            miss_policy: self.miss_policy,
            bootstrap_settle_ms: self.bootstrap_settle_ms,
            quiesce_ms: self.quiesce_ms,
            hop_settle_ms: self.hop_settle_ms,
            subnet: self.subnet.clone(),
            listen_port: self.port,
            seed: self.seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _telemetry =
        init_telemetry(&TelemetryConfig::from_env()).context("failed to initialise logging")?;

    let config = args.config();
    config
        .validate()
        .context("invalid experiment configuration")?;
    info!(
        case = config.case.name(),
        participants = config.total_participants,
        items = config.items_to_find,
        policy = %config.miss_policy,
        "Starting experiment"
    );

    let network = if args.sidecar {
        SimNetwork::new()
    } else {
        SimNetwork::new().without_sidecar()
    };
    let report = run_fleet(config, Arc::new(network)).await?;

    for participant in report.completed() {
        info!(
            index = participant.index,
            seq = participant.sequence,
            found = participant.summary.records_found,
            missed = participant.summary.records_missed,
            routing_table = participant.summary.routing_table_size,
            hops = %participant.average_hops,
            "Participant results"
        );
        if let Ok(text) = participant.metrics.encode() {
            debug!(index = participant.index, metrics = %text, "Participant metrics");
        }
    }

    if let Some(err) = report.first_error() {
        bail!("experiment failed: {err}");
    }
    info!("Experiment completed");
    Ok(())
}
