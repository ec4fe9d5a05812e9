//! Index provider trait definition.

use async_trait::async_trait;
use event_indexer_shared::EventRecord;

use crate::errors::IndexError;
use crate::types::IndexAck;

/// Abstracts the underlying document index (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are handed to the ingestion loop, which becomes their only user
/// once it starts. Tests inject mock implementations through the same seam.
///
/// All methods return `Result<T, IndexError>` so transport failures and engine-side
/// rejections reach the caller in one shape.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Verify the engine is reachable.
    ///
    /// Called once while initializing. Implementations must not retry.
    async fn check_connection(&self) -> Result<(), IndexError>;

    /// Index one record into `index`, letting the engine assign the document id.
    ///
    /// Issues at most one request and waits for the engine's answer.
    ///
    /// # Arguments
    ///
    /// * `index` - The destination index name
    /// * `record` - The record to store
    ///
    /// # Returns
    ///
    /// * `Ok(IndexAck)` - The engine's acknowledgment
    /// * `Err(IndexError)` - If the request failed or the engine rejected it
    async fn index_document(&self, index: &str, record: &EventRecord)
        -> Result<IndexAck, IndexError>;

    /// Release the connection to the engine.
    ///
    /// Called once by the ingestion loop when it stops. Calls made after `close`
    /// may fail.
    async fn close(&self) -> Result<(), IndexError> {
        Ok(())
    }
}
