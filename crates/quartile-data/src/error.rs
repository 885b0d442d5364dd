//! Error types for retrieval and caching.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while retrieving or caching filings.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from the upstream service
    #[error("HTTP error: {0}")]
    Http(String),

    /// OpenDART replied with an error status code
    #[error("DART API error {status}: {message}")]
    Api {
        /// DART status code, e.g. "020" for an exhausted key
        status: String,
        /// Human-readable message from the API
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Corporate directory payload could not be unpacked
    #[error("Directory archive error: {0}")]
    Archive(String),

    /// Corporate directory XML could not be parsed
    #[error("Directory XML error: {0}")]
    Xml(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// No directory entry for a stock code or company name
    #[error("Company not found in directory: {0}")]
    CorpNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
