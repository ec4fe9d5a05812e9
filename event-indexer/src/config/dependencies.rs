//! Dependency initialization and wiring for the event indexer.

use tracing::info;

use crate::config::IndexerConfig;
use crate::orchestrator::Orchestrator;
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configuration the dependencies were built from.
    pub config: IndexerConfig,
    /// The orchestrator, connected and pointed at the configured index.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`IndexerConfig::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration is invalid or the index engine
    ///   cannot be reached
    pub async fn new() -> Result<Self, IndexingError> {
        let config = IndexerConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Initialize all dependencies from an explicit configuration.
    pub async fn from_config(config: IndexerConfig) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %config.opensearch_url,
            index_name = %config.index_name,
            queue_capacity = config.queue_capacity,
            submit_timeout_secs = config.submit_timeout.map(|t| t.as_secs()),
            progress_interval_secs = config.progress_interval.as_secs(),
            "Initializing dependencies"
        );

        let orchestrator =
            Orchestrator::initialize(&config.opensearch_url, config.orchestrator_config()).await?;
        orchestrator.set_destination(config.index_name.clone());

        Ok(Self {
            config,
            orchestrator,
        })
    }
}
