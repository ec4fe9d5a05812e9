//! OpenSearch implementation of the index provider.

mod provider;

pub use provider::OpenSearchProvider;
