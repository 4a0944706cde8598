//! # Experiment Deadline
//!
//! A single deadline is fixed at process start. Every blocking rendezvous or
//! DHT call is wrapped with it; expiry is a fatal, non-retryable failure.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// The deadline fired while a phase was still blocked.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Experiment deadline exceeded during '{phase}'")]
pub struct DeadlineExceeded {
    /// Name of the phase that was waiting.
    pub phase: &'static str,
}

/// Absolute point in time after which the run is aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    #[must_use]
    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    #[must_use]
    pub fn instant(&self) -> Instant {
        self.at
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Run `fut` to completion unless the deadline fires first.
    pub async fn guard<F>(&self, phase: &'static str, fut: F) -> Result<F::Output, DeadlineExceeded>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.at, fut)
            .await
            .map_err(|_| DeadlineExceeded { phase })
    }

    /// Sleep for `pause`; fails if the deadline lands inside the pause.
    pub async fn sleep(&self, phase: &'static str, pause: Duration) -> Result<(), DeadlineExceeded> {
        self.guard(phase, tokio::time::sleep(pause)).await
    }
}
