//! Processor module for the event indexer ingest.
//!
//! Decodes raw queue messages into event records.

mod record_decoder;

pub use record_decoder::RecordDecoder;
