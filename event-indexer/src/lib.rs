//! # Event Indexer
//!
//! Drains tracking event messages from an in-process queue and indexes each one
//! into OpenSearch.
//!
//! ## Architecture
//!
//! The indexer follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Runs the ingestion loop over the queue
//! 2. **Processor**: Decodes raw messages into event records
//! 3. **Loader**: Submits records to the destination index
//! 4. **Orchestrator**: Starts, reconfigures and stops the loop
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`consumer`]: The ingestion loop and its queue abstraction
//! - [`processor`]: Decodes raw messages into records
//! - [`loader`]: Submits records into the index
//! - [`orchestrator`]: Lifecycle control of the ingestion loop
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use config::{Dependencies, IndexerConfig};
pub use errors::IngestError;
pub use orchestrator::{Orchestrator, OrchestratorConfig};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The index engine connection could not be established.
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::InitError(msg.into())
    }
}
