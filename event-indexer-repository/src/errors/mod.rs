//! Error types for the event indexer repository.

mod index_error;

pub use index_error::IndexError;
