//! The ingestion loop.
//!
//! Drains the queue one message at a time: decode, read the current destination,
//! submit, repeat. Per-message failures are logged and counted, never propagated.
//! The loop ends when the stop token is cancelled or the queue closes; both
//! inputs lead to the same `StopRequested -> Stopped` transition.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::consumer::queue::MessageQueue;
use crate::consumer::state::ConsumerState;
use crate::consumer::stats::{IngestStats, StatsSnapshot};
use crate::loader::IndexSubmitter;
use crate::processor::RecordDecoder;

/// Default interval between progress log lines.
const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Longest accepted interval between progress log lines.
pub const MAX_PROGRESS_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Why the loop left its receive cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Requested,
    QueueClosed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("stop requested"),
            Self::QueueClosed => f.write_str("queue closed"),
        }
    }
}

/// Per-message work of the loop: decode and submit.
struct Pipeline {
    decoder: RecordDecoder,
    submitter: IndexSubmitter,
    destination: watch::Receiver<String>,
    stats: Arc<IngestStats>,
}

impl Pipeline {
    async fn handle_message(&self, raw: &str) {
        self.stats.record_received();

        let record = match self.decoder.decode(raw) {
            Ok(record) => record,
            Err(e) => {
                self.stats.record_decode_failure();
                warn!(
                    error = %e,
                    payload_len = raw.len(),
                    "Skipping message that could not be decoded"
                );
                return;
            }
        };

        // Read per record so a rename applies to the next submission.
        let destination = self.destination.borrow().clone();

        match self.submitter.submit(&record, &destination).await {
            Ok(ack) => {
                self.stats.record_submitted();
                debug!(
                    index = %ack.index,
                    doc_id = %ack.id,
                    event = %record.event,
                    "Record indexed"
                );
            }
            Err(e) => {
                self.stats.record_submit_failure();
                error!(
                    index = %destination,
                    event = %record.event,
                    distinct_id = %record.distinct_id,
                    error = %e,
                    "Failed to index record, dropping it"
                );
            }
        }
    }
}

/// The single consumer of a message queue.
///
/// Messages are handled strictly in queue order, one submission at a time. The
/// submitter's provider is owned by the loop and closed when the loop stops.
pub struct IngestionLoop<Q> {
    queue: Q,
    pipeline: Pipeline,
    stop: CancellationToken,
    state: watch::Sender<ConsumerState>,
    progress_interval: Duration,
}

impl<Q: MessageQueue> IngestionLoop<Q> {
    /// Create a new ingestion loop.
    ///
    /// # Arguments
    ///
    /// * `queue` - The queue to drain
    /// * `decoder` - Turns raw messages into records
    /// * `submitter` - Writes records into the index
    /// * `destination` - Current destination index name, read before every submission
    /// * `stop` - Cancelled to request a stop
    pub fn new(
        queue: Q,
        decoder: RecordDecoder,
        submitter: IndexSubmitter,
        destination: watch::Receiver<String>,
        stop: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(ConsumerState::Running);
        Self {
            queue,
            pipeline: Pipeline {
                decoder,
                submitter,
                destination,
                stats: Arc::new(IngestStats::default()),
            },
            stop,
            state,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Set how often progress is logged. Zero is ignored; longer than
    /// [`MAX_PROGRESS_INTERVAL`] is clamped to it.
    pub fn with_progress_interval(mut self, progress_interval: Duration) -> Self {
        if !progress_interval.is_zero() {
            self.progress_interval = progress_interval.min(MAX_PROGRESS_INTERVAL);
        }
        self
    }

    /// Share counters with an outside observer.
    pub fn with_stats(mut self, stats: Arc<IngestStats>) -> Self {
        self.pipeline.stats = stats;
        self
    }

    /// Counters updated by this loop.
    pub fn stats(&self) -> Arc<IngestStats> {
        Arc::clone(&self.pipeline.stats)
    }

    /// Observe the loop's state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConsumerState> {
        self.state.subscribe()
    }

    /// Run the loop until a stop is requested or the queue closes.
    ///
    /// The stop token takes priority over a ready queue item, so once a stop is
    /// requested no further message is read. A submission already in flight is
    /// allowed to finish first.
    ///
    /// # Returns
    ///
    /// The final counters.
    pub async fn run(self) -> StatsSnapshot {
        let Self {
            mut queue,
            pipeline,
            stop,
            state,
            progress_interval,
        } = self;

        info!(
            progress_interval_secs = progress_interval.as_secs(),
            "Ingestion loop running"
        );

        let now = Instant::now();
        let first_tick = now
            .checked_add(progress_interval)
            .unwrap_or(now + MAX_PROGRESS_INTERVAL);
        let mut progress_timer = interval_at(first_tick, progress_interval);
        progress_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let reason = loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break StopReason::Requested,
                message = queue.next_message() => match message {
                    Some(raw) => pipeline.handle_message(&raw).await,
                    None => break StopReason::QueueClosed,
                },
                _ = progress_timer.tick() => {
                    let progress = pipeline.stats.snapshot();
                    info!(
                        received = progress.received,
                        submitted = progress.submitted,
                        decode_failures = progress.decode_failures,
                        submit_failures = progress.submit_failures,
                        "Ingestion progress"
                    );
                }
            }
        };

        state.send_replace(ConsumerState::StopRequested);
        info!(reason = %reason, "Ingestion loop stopping");

        if let Err(e) = pipeline.submitter.close().await {
            warn!(error = %e, "Failed to release index connection");
        }

        let totals = pipeline.stats.snapshot();
        state.send_replace(ConsumerState::Stopped);
        info!(
            received = totals.received,
            submitted = totals.submitted,
            decode_failures = totals.decode_failures,
            submit_failures = totals.submit_failures,
            "Ingestion loop stopped"
        );

        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use event_indexer_repository::{IndexAck, IndexError, IndexProvider};
    use event_indexer_shared::EventRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Mock provider that records `(index, event)` pairs and fails events named "fail".
    struct MockIndexProvider {
        indexed: Mutex<Vec<(String, String)>>,
        closed: AtomicUsize,
    }

    impl MockIndexProvider {
        fn new() -> Self {
            Self {
                indexed: Mutex::new(Vec::new()),
                closed: AtomicUsize::new(0),
            }
        }

        fn events(&self) -> Vec<String> {
            self.indexed
                .lock()
                .unwrap()
                .iter()
                .map(|(_, event)| event.clone())
                .collect()
        }
    }

    #[async_trait]
    impl IndexProvider for MockIndexProvider {
        async fn check_connection(&self) -> Result<(), IndexError> {
            Ok(())
        }

        async fn index_document(
            &self,
            index: &str,
            record: &EventRecord,
        ) -> Result<IndexAck, IndexError> {
            self.indexed
                .lock()
                .unwrap()
                .push((index.to_string(), record.event.clone()));
            if record.event == "fail" {
                return Err(IndexError::rejected(400, "mapper_parsing_exception"));
            }
            Ok(IndexAck {
                index: index.to_string(),
                id: record.event.clone(),
                result: "created".to_string(),
            })
        }

        async fn close(&self) -> Result<(), IndexError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn build_loop(
        provider: Arc<MockIndexProvider>,
        queue: mpsc::Receiver<String>,
        stop: CancellationToken,
    ) -> (IngestionLoop<mpsc::Receiver<String>>, watch::Sender<String>) {
        let (destination_tx, destination_rx) = watch::channel("events".to_string());
        let ingestion = IngestionLoop::new(
            queue,
            RecordDecoder::new(),
            IndexSubmitter::new(provider),
            destination_rx,
            stop,
        );
        (ingestion, destination_tx)
    }

    #[tokio::test]
    async fn test_drains_queue_in_order_until_closed() {
        let provider = Arc::new(MockIndexProvider::new());
        let (tx, rx) = mpsc::channel(8);
        let (ingestion, _destination) = build_loop(provider.clone(), rx, CancellationToken::new());
        let state = ingestion.subscribe_state();

        for event in ["a", "b", "c"] {
            tx.send(format!(r#"{{"event":"{}"}}"#, event)).await.unwrap();
        }
        drop(tx);

        let totals = ingestion.run().await;

        assert_eq!(provider.events(), vec!["a", "b", "c"]);
        assert_eq!(totals.received, 3);
        assert_eq!(totals.submitted, 3);
        assert_eq!(*state.borrow(), ConsumerState::Stopped);
        assert_eq!(provider.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_skips_undecodable_and_failed_messages() {
        let provider = Arc::new(MockIndexProvider::new());
        let (tx, rx) = mpsc::channel(8);
        let (ingestion, _destination) = build_loop(provider.clone(), rx, CancellationToken::new());

        tx.send(r#"{"event":"fail"}"#.to_string()).await.unwrap();
        tx.send("not-json".to_string()).await.unwrap();
        tx.send(r#"{"event":"ok"}"#.to_string()).await.unwrap();
        drop(tx);

        let totals = ingestion.run().await;

        assert_eq!(provider.events(), vec!["fail", "ok"]);
        assert_eq!(
            totals,
            StatsSnapshot {
                received: 3,
                decode_failures: 1,
                submitted: 1,
                submit_failures: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_stop_before_run_reads_nothing() {
        let provider = Arc::new(MockIndexProvider::new());
        let (tx, rx) = mpsc::channel(8);
        let stop = CancellationToken::new();
        let (ingestion, _destination) = build_loop(provider.clone(), rx, stop.clone());

        tx.send(r#"{"event":"a"}"#.to_string()).await.unwrap();
        stop.cancel();

        let totals = ingestion.run().await;

        assert_eq!(totals.received, 0);
        assert!(provider.events().is_empty());
        assert_eq!(provider.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reads_destination_per_record() {
        let provider = Arc::new(MockIndexProvider::new());
        let (tx, rx) = mpsc::channel(8);
        let (ingestion, destination) = build_loop(provider.clone(), rx, CancellationToken::new());
        let handle = tokio::spawn(ingestion.run());

        tx.send(r#"{"event":"a"}"#.to_string()).await.unwrap();
        while provider.events().is_empty() {
            tokio::task::yield_now().await;
        }
        destination.send_replace("events-2".to_string());
        tx.send(r#"{"event":"b"}"#.to_string()).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        let indexed = provider.indexed.lock().unwrap().clone();
        assert_eq!(
            indexed,
            vec![
                ("events".to_string(), "a".to_string()),
                ("events-2".to_string(), "b".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_oversized_progress_interval_is_clamped() {
        let provider = Arc::new(MockIndexProvider::new());
        let (tx, rx) = mpsc::channel(8);
        let (ingestion, _destination) = build_loop(provider.clone(), rx, CancellationToken::new());
        let ingestion = ingestion.with_progress_interval(Duration::MAX);
        assert_eq!(ingestion.progress_interval, MAX_PROGRESS_INTERVAL);

        tx.send(r#"{"event":"a"}"#.to_string()).await.unwrap();
        drop(tx);
        let totals = tokio::spawn(ingestion.run()).await.unwrap();

        assert_eq!(totals.submitted, 1);
        assert_eq!(provider.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_stats() {
        let provider = Arc::new(MockIndexProvider::new());
        let (tx, rx) = mpsc::channel(8);
        let stats = Arc::new(IngestStats::default());
        let (ingestion, _destination) = build_loop(provider, rx, CancellationToken::new());
        let ingestion = ingestion.with_stats(stats.clone());

        tx.send(r#"{"event":"a"}"#.to_string()).await.unwrap();
        drop(tx);
        ingestion.run().await;

        assert_eq!(stats.snapshot().submitted, 1);
    }
}
