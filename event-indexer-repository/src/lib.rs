//! # Event Indexer Repository
//!
//! This crate provides the trait and implementation for writing event records
//! into a document index. It includes definitions for errors, the provider
//! interface, and a concrete implementation for OpenSearch (which also speaks
//! the Elasticsearch document API).

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::IndexError;
pub use interfaces::IndexProvider;
pub use opensearch::OpenSearchProvider;
pub use types::IndexAck;
