//! # Event Indexer Shared
//!
//! Shared types used by the event indexer and its repository crate.

pub mod types;

pub use types::EventRecord;
