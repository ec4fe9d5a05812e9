//! Orchestrator module for the event indexer ingest.
//!
//! Owns the lifecycle of one ingestion loop: connect to the index engine, set the
//! destination index, start the loop against a queue, and stop it.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use event_indexer_repository::{IndexProvider, OpenSearchProvider};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::consumer::{ConsumerState, IngestStats, IngestionLoop, MessageQueue, StatsSnapshot};
use crate::errors::IngestError;
use crate::loader::IndexSubmitter;
use crate::processor::RecordDecoder;
use crate::IndexingError;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Interval between progress log lines.
    pub progress_interval: Duration,
    /// Give up on a single submission after this long. `None` waits forever.
    pub submit_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_secs(10),
            submit_timeout: None,
        }
    }
}

/// Orchestrator that controls one ingestion loop.
///
/// The orchestrator:
/// - Holds the index connection until `start` hands it to the loop
/// - Publishes the destination index name read by the loop
/// - Signals the loop to stop and waits for it
///
/// Dropping the orchestrator requests a stop but does not wait for it.
pub struct Orchestrator {
    provider: Option<Arc<dyn IndexProvider>>,
    config: OrchestratorConfig,
    destination: watch::Sender<String>,
    stop: CancellationToken,
    stats: Arc<IngestStats>,
    state: Option<watch::Receiver<ConsumerState>>,
    task: Option<JoinHandle<StatsSnapshot>>,
}

impl Orchestrator {
    /// Connect to the index engine at `endpoint` and build an orchestrator over it.
    ///
    /// Fails fast: a malformed or unreachable endpoint is an initialization error
    /// and is not retried.
    #[instrument(skip(config))]
    pub async fn initialize(
        endpoint: &str,
        config: OrchestratorConfig,
    ) -> Result<Self, IndexingError> {
        let provider = OpenSearchProvider::connect(endpoint).await.map_err(|e| {
            IndexingError::init(format!(
                "Failed to connect to index engine at {}: {}",
                endpoint, e
            ))
        })?;

        info!(endpoint = %endpoint, "Index engine connection established");
        Ok(Self::with_provider(Arc::new(provider), config))
    }

    /// Build an orchestrator over an already connected provider.
    ///
    /// The destination starts empty; submissions fail until `set_destination` is called.
    pub fn with_provider(provider: Arc<dyn IndexProvider>, config: OrchestratorConfig) -> Self {
        let (destination, _) = watch::channel(String::new());

        Self {
            provider: Some(provider),
            config,
            destination,
            stop: CancellationToken::new(),
            stats: Arc::new(IngestStats::default()),
            state: None,
            task: None,
        }
    }

    /// Change the destination index.
    ///
    /// Applies to the next submission. A submission already in flight completes
    /// against the previous destination.
    pub fn set_destination(&self, index_name: impl Into<String>) {
        let index_name = index_name.into();
        info!(index = %index_name, "Destination index changed");
        self.destination.send_replace(index_name);
    }

    /// The current destination index.
    pub fn destination(&self) -> String {
        self.destination.borrow().clone()
    }

    /// Spawn the ingestion loop against `queue`.
    ///
    /// The index connection moves into the loop. Starting twice is an error.
    #[instrument(skip(self, queue))]
    pub fn start<Q>(&mut self, queue: Q) -> Result<(), IngestError>
    where
        Q: MessageQueue + 'static,
    {
        let provider = self.provider.take().ok_or(IngestError::AlreadyStarted)?;

        let submitter = IndexSubmitter::with_timeout(provider, self.config.submit_timeout);
        let ingestion = IngestionLoop::new(
            queue,
            RecordDecoder::new(),
            submitter,
            self.destination.subscribe(),
            self.stop.clone(),
        )
        .with_progress_interval(self.config.progress_interval)
        .with_stats(Arc::clone(&self.stats));

        self.state = Some(ingestion.subscribe_state());
        self.task = Some(tokio::spawn(ingestion.run()));

        info!(index = %self.destination(), "Ingestion loop started");
        Ok(())
    }

    /// Request a stop and wait until the loop has stopped.
    ///
    /// Safe to call more than once, and a no-op wait when the loop never started.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), IngestError> {
        if !self.stop.is_cancelled() {
            info!("Stop requested");
            self.stop.cancel();
        }
        self.join().await
    }

    /// Wait until the loop stops on its own (its queue closed) or through `stop`.
    ///
    /// Cancel-safe: dropping the returned future leaves the loop running and a later
    /// `stop` or `wait` still waits for it.
    pub async fn wait(&mut self) -> Result<(), IngestError> {
        self.join().await
    }

    /// Wait for the loop to stop, stopping it early when `shutdown` resolves.
    ///
    /// If `shutdown` fails (no signal handler could be installed), the loop keeps
    /// running and this waits for it to stop on its own.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), IngestError>
    where
        F: Future<Output = io::Result<()>>,
    {
        tokio::select! {
            result = self.wait() => result,
            signal = shutdown => match signal {
                Ok(()) => {
                    info!("Shutdown signal received");
                    self.stop().await
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "Failed to listen for shutdown signal, waiting for the queue to close"
                    );
                    self.wait().await
                }
            }
        }
    }

    /// Current state of the loop, or `None` before `start`.
    pub fn state(&self) -> Option<ConsumerState> {
        self.state.as_ref().map(|state| *state.borrow())
    }

    /// Snapshot of the ingestion counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    async fn join(&mut self) -> Result<(), IngestError> {
        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };

        let result = task.await;
        self.task = None;

        let totals = result.map_err(|e| IngestError::TaskError(e.to_string()))?;
        info!(
            received = totals.received,
            submitted = totals.submitted,
            decode_failures = totals.decode_failures,
            submit_failures = totals.submit_failures,
            "Orchestrator shutdown complete"
        );
        Ok(())
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if self.task.is_some() && !self.stop.is_cancelled() {
            warn!("Orchestrator dropped while the ingestion loop was running; requesting stop");
            self.stop.cancel();
        }
    }
}
