//! # Kad-Testbed Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks of the pure planners
//! └── src/integration/  # whole fleets over the in-memory rendezvous
//!     ├── fleet_flows.rs    # dht-case and mldht-case happy paths
//!     ├── fault_flows.rs    # dial failures, missing sidecar, deadlines
//!     └── hop_flows.rs      # simulated DHT events into the hop table
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kt-tests
//! cargo test -p kt-tests integration::fault_flows::
//! cargo bench -p kt-tests
//! ```

#![allow(dead_code)]

pub mod integration;
