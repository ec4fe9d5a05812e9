//! Loader module for the event indexer ingest.
//!
//! Submits decoded records into the destination index, one request per record.

use std::sync::Arc;
use std::time::Duration;

use event_indexer_repository::{IndexAck, IndexError, IndexProvider};
use event_indexer_shared::EventRecord;
use tracing::{debug, instrument};

use crate::errors::IngestError;

/// Submitter that writes records into the index engine.
///
/// The submitter never retries and never decides to stop the pipeline; failures
/// are returned to the caller as they are.
pub struct IndexSubmitter {
    provider: Arc<dyn IndexProvider>,
    submit_timeout: Option<Duration>,
}

impl IndexSubmitter {
    /// Create a new submitter over the given provider.
    pub fn new(provider: Arc<dyn IndexProvider>) -> Self {
        Self {
            provider,
            submit_timeout: None,
        }
    }

    /// Create a new submitter that gives up on a request after `submit_timeout`.
    pub fn with_timeout(provider: Arc<dyn IndexProvider>, submit_timeout: Option<Duration>) -> Self {
        Self {
            provider,
            submit_timeout,
        }
    }

    /// Submit one record to `destination`.
    ///
    /// Issues at most one index request and waits for the engine's answer.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexAck)` - The engine acknowledged the document
    /// * `Err(IngestError::SubmitError)` - The engine failed or rejected the record
    /// * `Err(IngestError::SubmitTimeout)` - No answer within the configured timeout
    #[instrument(skip(self, record), fields(event = %record.event))]
    pub async fn submit(
        &self,
        record: &EventRecord,
        destination: &str,
    ) -> Result<IndexAck, IngestError> {
        if destination.is_empty() {
            return Err(IndexError::validation("Destination index name is empty").into());
        }

        let request = self.provider.index_document(destination, record);
        let ack = match self.submit_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| IngestError::SubmitTimeout(limit))??,
            None => request.await?,
        };

        debug!(index = %ack.index, doc_id = %ack.id, "Record submitted");
        Ok(ack)
    }

    /// Release the provider's connection to the engine.
    pub async fn close(&self) -> Result<(), IngestError> {
        self.provider.close().await?;
        Ok(())
    }
}
