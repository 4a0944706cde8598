//! # Hop Instrumentor Service
//!
//! `SharedHopTable` is the one datum two activities touch: the consumer task
//! writes it, the discovery loop reads the `provider` entry. Writers take
//! the exclusive side of the lock, readers the shared side.
//!
//! `HopInstrumentor::spawn` starts the single consumer. It stops when the
//! event stream closes, the deadline fires, or shutdown is signalled, and
//! the returned handle is always joined by the owner.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, trace};

use shared_types::{ContentKey, Deadline, LookupEvent};

use crate::domain::errors::HopCounterError;
use crate::domain::table::{ApplyOutcome, HopTable};
use crate::ports::outbound::{LookupEventSource, LookupEventStream};

/// Hop table shared between the consumer task and the discovery loop.
#[derive(Debug, Clone, Default)]
pub struct SharedHopTable {
    inner: Arc<RwLock<HopTable>>,
}

impl SharedHopTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_query(&self, key: &ContentKey) {
        self.inner.write().begin_query(key);
    }

    #[must_use]
    pub fn provider_hops(&self, key: &ContentKey) -> Option<u32> {
        self.inner.read().provider_hops(key)
    }

    /// Run `f` against the table under the shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&HopTable) -> T) -> T {
        f(&self.inner.read())
    }

    fn apply(&self, event: &LookupEvent) -> ApplyOutcome {
        self.inner.write().apply(event)
    }
}

/// Why the consumer task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentorExit {
    StreamClosed,
    Cancelled,
    DeadlineExceeded,
}

/// Summary returned when the consumer task is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentorReport {
    pub exit: InstrumentorExit,
    /// Events received from the stream.
    pub events_seen: u64,
    /// Events that updated a tracked key.
    pub events_applied: u64,
}

/// Single consumer of a node's lookup event stream.
pub struct HopInstrumentor;

impl HopInstrumentor {
    /// Register for `source`'s events and start consuming them into `table`.
    ///
    /// # Errors
    ///
    /// `HopCounterError::Registration` if the stream cannot be obtained.
    pub fn spawn<S>(
        source: &S,
        table: SharedHopTable,
        deadline: Deadline,
        shutdown: watch::Receiver<bool>,
    ) -> Result<JoinHandle<InstrumentorReport>, HopCounterError>
    where
        S: LookupEventSource + ?Sized,
    {
        let events = source.register_for_lookup_events()?;
        debug!("Lookup event consumer registered");
        Ok(tokio::spawn(consume(events, table, deadline, shutdown)))
    }
}

async fn consume(
    mut events: LookupEventStream,
    table: SharedHopTable,
    deadline: Deadline,
    mut shutdown: watch::Receiver<bool>,
) -> InstrumentorReport {
    let expiry = tokio::time::sleep_until(deadline.instant());
    tokio::pin!(expiry);

    let mut events_seen = 0u64;
    let mut events_applied = 0u64;

    let exit = loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break InstrumentorExit::Cancelled;
                }
            }
            () = &mut expiry => break InstrumentorExit::DeadlineExceeded,
            next = events.next() => {
                let Some(event) = next else {
                    break InstrumentorExit::StreamClosed;
                };
                events_seen += 1;
                match table.apply(&event) {
                    ApplyOutcome::Untracked => {
                        debug!(key = %event.key, query = %event.query_id, "Event for untracked key ignored");
                    }
                    ApplyOutcome::NoResponse => {}
                    ApplyOutcome::Updated { learned, provider } => {
                        events_applied += 1;
                        trace!(key = %event.key, learned, ?provider, "Hop table updated");
                    }
                }
            }
        }
    };

    info!(?exit, events_seen, events_applied, "Lookup event consumer stopped");
    InstrumentorReport {
        exit,
        events_seen,
        events_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use shared_types::{DhtError, LookupResponse, PeerId};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;
    use uuid::Uuid;

    struct ChannelSource {
        rx: Mutex<Option<mpsc::UnboundedReceiver<LookupEvent>>>,
    }

    impl ChannelSource {
        fn new() -> (Self, mpsc::UnboundedSender<LookupEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Self {
                    rx: Mutex::new(Some(rx)),
                },
                tx,
            )
        }
    }

    impl LookupEventSource for ChannelSource {
        fn register_for_lookup_events(&self) -> Result<LookupEventStream, DhtError> {
            let rx = self.rx.lock().take().ok_or(DhtError::EventsAlreadyRegistered)?;
            Ok(Box::pin(UnboundedReceiverStream::new(rx)))
        }
    }

    fn key() -> ContentKey {
        ContentKey::from_payload(b"instrumentor")
    }

    fn event(cause: u8, heard: &[u8], queried: &[u8]) -> LookupEvent {
        LookupEvent::new(
            Uuid::new_v4(),
            key(),
            Some(LookupResponse {
                source: PeerId([cause; 32]),
                cause: PeerId([cause; 32]),
                heard: heard.iter().map(|&i| PeerId([i; 32])).collect(),
                queried: queried.iter().map(|&i| PeerId([i; 32])).collect(),
            }),
        )
    }

    #[tokio::test]
    async fn test_consumer_applies_events_in_order() {
        let (source, tx) = ChannelSource::new();
        let table = SharedHopTable::new();
        table.begin_query(&key());
        let (_stop, shutdown) = watch::channel(false);

        let handle = HopInstrumentor::spawn(
            &source,
            table.clone(),
            Deadline::after(Duration::from_secs(60)),
            shutdown,
        )
        .unwrap();

        tx.send(event(1, &[2], &[1])).unwrap();
        tx.send(event(2, &[3], &[2])).unwrap();
        tx.send(event(3, &[], &[3])).unwrap();
        tx.send(LookupEvent::new(Uuid::new_v4(), ContentKey::from_payload(b"other"), None))
            .unwrap();
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.exit, InstrumentorExit::StreamClosed);
        assert_eq!(report.events_seen, 4);
        assert_eq!(report.events_applied, 3);
        assert_eq!(table.provider_hops(&key()), Some(2));
        assert_eq!(table.read(|t| t.entry_len(&key())), 3);
    }

    #[tokio::test]
    async fn test_shutdown_stops_consumer() {
        let (source, _tx) = ChannelSource::new();
        let (stop, shutdown) = watch::channel(false);
        let handle = HopInstrumentor::spawn(
            &source,
            SharedHopTable::new(),
            Deadline::after(Duration::from_secs(60)),
            shutdown,
        )
        .unwrap();

        stop.send(true).unwrap();
        let report = handle.await.unwrap();
        assert_eq!(report.exit, InstrumentorExit::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_consumer() {
        let (source, _tx) = ChannelSource::new();
        let (_stop, shutdown) = watch::channel(false);
        let handle = HopInstrumentor::spawn(
            &source,
            SharedHopTable::new(),
            Deadline::after(Duration::from_secs(5)),
            shutdown,
        )
        .unwrap();

        let report = handle.await.unwrap();
        assert_eq!(report.exit, InstrumentorExit::DeadlineExceeded);
        assert_eq!(report.events_seen, 0);
    }

    #[tokio::test]
    async fn test_second_registration_fails() {
        let (source, _tx) = ChannelSource::new();
        let (_stop, shutdown) = watch::channel(false);
        let deadline = Deadline::after(Duration::from_secs(60));
        let _first =
            HopInstrumentor::spawn(&source, SharedHopTable::new(), deadline, shutdown.clone())
                .unwrap();

        let err = HopInstrumentor::spawn(&source, SharedHopTable::new(), deadline, shutdown)
            .unwrap_err();
        assert_eq!(
            err,
            HopCounterError::Registration(DhtError::EventsAlreadyRegistered)
        );
    }
}
