//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration validation error (after CLI overrides)
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Neither the config file nor the CLI named an endpoint
    #[error("No endpoint given: pass --config or --endpoint")]
    MissingEndpoint,

    /// One input line is not a metric
    #[error("Invalid metric on line {line}: {message}")]
    InvalidMetric { line: usize, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn invalid_metric(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidMetric {
            line,
            message: message.into(),
        }
    }
}
