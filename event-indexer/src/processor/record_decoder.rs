//! Record decoder implementation.
//!
//! Turns raw message text into an `EventRecord`. Decoding is tolerant per field:
//! producers are not fully trusted, and a partial record is worth more than a
//! dropped one. Only a message that is not a JSON object at all is rejected.

use event_indexer_shared::EventRecord;
use serde_json::{Map, Value};

use crate::errors::IngestError;

/// Decoder that turns raw messages into event records.
///
/// The decoder is pure: it holds no state and has no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordDecoder;

impl RecordDecoder {
    /// Create a new record decoder.
    pub fn new() -> Self {
        Self
    }

    /// Decode one raw message.
    ///
    /// Each known field is extracted on its own. A missing field, or one whose JSON
    /// type does not match, takes the field's zero value instead of failing the
    /// whole message.
    ///
    /// # Returns
    ///
    /// * `Ok(EventRecord)` - A fully populated record
    /// * `Err(IngestError::DecodeError)` - If `raw` is not a JSON object
    pub fn decode(&self, raw: &str) -> Result<EventRecord, IngestError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| IngestError::decode(format!("Invalid JSON: {}", e)))?;

        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(IngestError::decode(format!(
                    "Expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(EventRecord {
            lib: text_field(&fields, EventRecord::LIB),
            receive_time: integer_field(&fields, EventRecord::RECEIVE_TIME),
            event_type: text_field(&fields, EventRecord::TYPE),
            track_id: integer_field(&fields, EventRecord::TRACK_ID),
            report_time: integer_field(&fields, EventRecord::REPORT_TIME),
            distinct_id: text_field(&fields, EventRecord::DISTINCT_ID),
            sink_time: integer_field(&fields, EventRecord::SINK_TIME),
            time: integer_field(&fields, EventRecord::TIME),
            event: text_field(&fields, EventRecord::EVENT),
            properties: text_field(&fields, EventRecord::PROPERTIES),
        })
    }
}

/// Extract a string field, or `""` when absent or not a string.
fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Extract an integer field, or `0` when absent or not an integer.
///
/// Floats are accepted only when they carry no fractional part and fit in `i64`
/// (some producers emit `1.7e12` for millisecond timestamps).
fn integer_field(fields: &Map<String, Value>, key: &str) -> i64 {
    match fields.get(key) {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .unwrap_or(0),
        _ => 0,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
