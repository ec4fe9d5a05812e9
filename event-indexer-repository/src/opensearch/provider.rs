//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `IndexProvider`
//! using the OpenSearch Rust crate.

use std::sync::RwLock;

use async_trait::async_trait;
use event_indexer_shared::EventRecord;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    IndexParts, OpenSearch,
};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::IndexError;
use crate::interfaces::IndexProvider;
use crate::types::IndexAck;

/// OpenSearch provider implementation.
///
/// Holds a single client for one engine endpoint. The client is dropped by
/// `close`, after which every operation fails with a connection error.
///
/// # Example
///
/// ```ignore
/// let provider = OpenSearchProvider::connect("http://localhost:9200").await?;
/// let ack = provider.index_document("events", &record).await?;
/// ```
pub struct OpenSearchProvider {
    url: String,
    client: RwLock<Option<OpenSearch>>,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider for the specified URL.
    ///
    /// Only builds the client; no request is sent. Use [`OpenSearchProvider::connect`]
    /// to also verify the engine answers.
    ///
    /// # Arguments
    ///
    /// * `url` - The engine URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(IndexError)` - If the URL is malformed or the transport cannot be built
    pub fn new(url: &str) -> Result<Self, IndexError> {
        let parsed_url = Url::parse(url).map_err(|e| IndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| IndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self {
            url: url.to_string(),
            client: RwLock::new(Some(client)),
        })
    }

    /// Create a provider and ping the engine once.
    ///
    /// Fails fast: an unreachable or malformed endpoint is reported immediately
    /// and never retried.
    pub async fn connect(url: &str) -> Result<Self, IndexError> {
        let provider = Self::new(url)?;
        provider.check_connection().await?;
        Ok(provider)
    }

    /// The endpoint this provider talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get a handle to the client, or fail if the provider was closed.
    fn client(&self) -> Result<OpenSearch, IndexError> {
        let guard = self
            .client
            .read()
            .map_err(|_| IndexError::connection("OpenSearch client lock poisoned"))?;
        guard
            .clone()
            .ok_or_else(|| IndexError::connection("OpenSearch client has been closed"))
    }
}

#[async_trait]
impl IndexProvider for OpenSearchProvider {
    async fn check_connection(&self) -> Result<(), IndexError> {
        let client = self.client()?;

        let response = client
            .ping()
            .send()
            .await
            .map_err(|e| IndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            error!(url = %self.url, status = %status, "Ping request failed");
            return Err(IndexError::connection(format!(
                "Ping to {} failed with status {}",
                self.url, status
            )));
        }

        debug!(url = %self.url, "OpenSearch is reachable");
        Ok(())
    }

    /// Index one record with an engine-assigned id (`POST /{index}/_doc`).
    ///
    /// Non-success statuses are returned as `IndexError::Rejected` carrying the
    /// engine's response body, which usually names the failing field or shard.
    async fn index_document(
        &self,
        index: &str,
        record: &EventRecord,
    ) -> Result<IndexAck, IndexError> {
        if index.is_empty() {
            return Err(IndexError::validation("Destination index name is empty"));
        }

        let client = self.client()?;

        let response = client
            .index(IndexParts::Index(index))
            .body(record)
            .send()
            .await
            .map_err(|e| IndexError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Index request failed");
            return Err(IndexError::rejected(status.as_u16(), error_body));
        }

        let ack = response
            .json::<IndexAck>()
            .await
            .map_err(|e| IndexError::parse(e.to_string()))?;

        debug!(index = %ack.index, doc_id = %ack.id, result = %ack.result, "Document indexed");
        Ok(ack)
    }

    async fn close(&self) -> Result<(), IndexError> {
        let mut guard = self
            .client
            .write()
            .map_err(|_| IndexError::connection("OpenSearch client lock poisoned"))?;
        if guard.take().is_some() {
            info!(url = %self.url, "OpenSearch client released");
        }
        Ok(())
    }
}
