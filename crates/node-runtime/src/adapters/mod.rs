//! # Adapter Implementations
//!
//! Concrete implementations of the subsystem outbound ports.
//!
//! | Adapter | Implements |
//! |---------|------------|
//! | `SimNode` | `PeerConnector`, `ContentRouting`, `LookupEventSource`, `RoutingTableProbe` |
//! | `SimNetwork` | `NetworkLayer` |
//! | `HopTableProbe` | `HopProbe` |
//! | `PrometheusRecorder` | `MetricsRecorder` |

pub mod hop_probe;
pub mod metrics;
pub mod network;
pub mod simulation;

pub use hop_probe::HopTableProbe;
pub use metrics::PrometheusRecorder;
pub use network::{DhtNode, NetworkLayer};
pub use simulation::{SimNetwork, SimNode};
