//! Event record types for the document index.
//!
//! This module defines the canonical shape of one tracking event, both as it is
//! decoded from the queue and as it is stored in the index.

use serde::{Deserialize, Serialize};

/// Canonical representation of one ingested tracking event.
///
/// Every field is always present. Fields missing from the incoming message hold
/// their zero value (`""` for text, `0` for numbers), so a record never carries
/// partial state.
///
/// # Fields
///
/// - `lib`: Library tag of the SDK that produced the event
/// - `receive_time`: When the collector received the event (ms since epoch)
/// - `event_type`: Event category, stored under the `type` key
/// - `track_id`: Producer-assigned tracking identifier, stored under `_track_id`
/// - `report_time`: When the client reported the event (ms since epoch)
/// - `distinct_id`: Identifier of the user or device
/// - `sink_time`: When the event was handed to the sink (ms since epoch)
/// - `time`: When the event happened (ms since epoch)
/// - `event`: Event name
/// - `properties`: Free-form properties payload, kept as text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    pub lib: String,
    pub receive_time: i64,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "_track_id")]
    pub track_id: i64,
    pub report_time: i64,
    pub distinct_id: String,
    pub sink_time: i64,
    pub time: i64,
    pub event: String,
    pub properties: String,
}

impl EventRecord {
    /// JSON key of the library tag.
    pub const LIB: &'static str = "lib";
    /// JSON key of the receive timestamp.
    pub const RECEIVE_TIME: &'static str = "receive_time";
    /// JSON key of the event type.
    pub const TYPE: &'static str = "type";
    /// JSON key of the tracking identifier.
    pub const TRACK_ID: &'static str = "_track_id";
    /// JSON key of the report timestamp.
    pub const REPORT_TIME: &'static str = "report_time";
    /// JSON key of the distinct identifier.
    pub const DISTINCT_ID: &'static str = "distinct_id";
    /// JSON key of the sink timestamp.
    pub const SINK_TIME: &'static str = "sink_time";
    /// JSON key of the event timestamp.
    pub const TIME: &'static str = "time";
    /// JSON key of the event name.
    pub const EVENT: &'static str = "event";
    /// JSON key of the properties payload.
    pub const PROPERTIES: &'static str = "properties";
}
