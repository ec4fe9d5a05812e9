//! Consumer module for the event indexer ingest.
//!
//! Provides the ingestion loop that drains the message queue, together with the
//! queue abstraction, consumer state, and ingestion counters.

mod ingestion_loop;
mod queue;
mod state;
mod stats;

pub use ingestion_loop::{IngestionLoop, MAX_PROGRESS_INTERVAL};
pub use queue::{MessageQueue, StreamQueue};
pub use state::ConsumerState;
pub use stats::{IngestStats, StatsSnapshot};
