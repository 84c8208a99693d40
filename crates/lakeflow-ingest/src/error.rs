//! Error types for ingestion operations.

use thiserror::Error;

/// Errors that can occur during an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to connect to the source database.
    #[error("Source connection error: {0}")]
    ConnectionError(String),

    /// Failed to extract rows or documents from the source.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// Failed to serialize a batch for writing.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to write a batch to the destination store.
    #[error("Storage write error: {0}")]
    StorageError(String),
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        IngestError::SerializationError(e.to_string())
    }
}
