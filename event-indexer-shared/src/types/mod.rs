//! Shared types for the event indexer.

mod event_record;

pub use event_record::EventRecord;
