//! Index error types.
//!
//! Every failure to reach or write into the index engine is reported through
//! `IndexError`, so callers can treat transport and engine-side failures uniformly.

use thiserror::Error;

/// Errors from index provider operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Invalid input (e.g., an empty index name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish or use the connection to the index engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be delivered or no response was received.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The engine answered with a non-success status (e.g., a mapping conflict).
    #[error("Index rejected document with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Failed to parse the engine response.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl IndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a rejection error from the engine's status and response body.
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
