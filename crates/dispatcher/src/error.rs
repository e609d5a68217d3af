//! Dispatcher error types

use std::io;

use line_protocol::EncodeError;
use thiserror::Error;

/// Failures surfaced by the dispatcher
///
/// `Config` is returned synchronously from construction; every other
/// variant is delivered to the error listener and never to producers.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Invalid client configuration
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Transport could not be opened; the batch was dropped
    #[error("failed to connect to '{endpoint}': {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// One record could not be encoded; it was skipped
    #[error("failed to encode metric: {0}")]
    Encode(#[from] EncodeError),

    /// Writing the batch payload failed
    #[error("failed to write batch to '{endpoint}': {source}")]
    Write {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Closing the transport failed after writing
    #[error("failed to close connection to '{endpoint}': {source}")]
    Close {
        endpoint: String,
        #[source]
        source: io::Error,
    },
}

impl DispatchError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Connect { .. } => "connect",
            Self::Encode(_) => "encode",
            Self::Write { .. } => "write",
            Self::Close { .. } => "close",
        }
    }
}
