//! Error types for query gateway operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while executing an analytical query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The engine or a page fetch could not be reached or answered.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine reported the query as failed or cancelled.
    #[error("Query failed: {0}")]
    Failed(String),

    /// Polling exceeded the configured maximum wait budget.
    #[error("Query timed out after {0:?}")]
    TimedOut(Duration),

    /// Invalid or missing gateway configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for query gateway operations.
pub type Result<T> = std::result::Result<T, QueryError>;
