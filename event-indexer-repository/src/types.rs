//! Response types for index operations.

use serde::Deserialize;

/// The engine's acknowledgment of one indexed document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexAck {
    /// The index the document was written to.
    #[serde(rename = "_index")]
    pub index: String,
    /// The id assigned to the document.
    #[serde(rename = "_id")]
    pub id: String,
    /// Outcome reported by the engine (e.g., "created").
    #[serde(default)]
    pub result: String,
}
