//! Error types for the event indexer ingest.

use std::time::Duration;

use event_indexer_repository::IndexError;
use thiserror::Error;

/// Errors that can occur in the event indexer ingest.
///
/// `DecodeError`, `SubmitError` and `SubmitTimeout` are per-message failures: the
/// ingestion loop logs them and moves on to the next message.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The raw message is not a structured object.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The index engine failed or rejected the record.
    #[error("Submit error: {0}")]
    SubmitError(#[from] IndexError),

    /// The index engine did not answer in time.
    #[error("Submit timed out after {0:?}")]
    SubmitTimeout(Duration),

    /// `start` was called on an orchestrator that already started its loop.
    #[error("Ingestion loop already started")]
    AlreadyStarted,

    /// The ingestion task panicked or was aborted.
    #[error("Ingestion task error: {0}")]
    TaskError(String),
}

impl IngestError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }
}
