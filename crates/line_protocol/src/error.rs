//! Encoder error types

use thiserror::Error;

/// Per-record encoding failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Measurement name is empty
    #[error("metric has an empty name")]
    EmptyName,

    /// No field survived encoding
    #[error("metric '{name}' has no encodable fields")]
    NoFields { name: String },

    /// Timestamp does not fit in i64 nanoseconds
    #[error("metric '{name}' timestamp is outside the nanosecond range")]
    TimestampOutOfRange { name: String },
}
