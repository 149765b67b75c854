//! Error types for the KISSmetrics client
//!
//! All errors propagate synchronously to the caller; nothing is retried
//! internally. A failed flush leaves the durable store intact so the data can
//! be resent (at the cost of possible duplicates).

use thiserror::Error;

/// Result type alias for KISSmetrics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the KISSmetrics client
#[derive(Debug, Error)]
pub enum Error {
    /// Client is not ready to record: missing API key or no identified user
    #[error("setup error: {0}")]
    Setup(String),

    /// A delayed store was asked to persist or flush an empty batch
    #[error("no queries to process")]
    NoQueries,

    /// Transport-level failure with context about what was being delivered
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O error (query log file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (connect, send, or timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error (query log entries)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis operation failed
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Endpoint URL could not be constructed from the configuration
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl Error {
    /// Setup error for a missing or empty API key
    pub(crate) fn missing_key() -> Self {
        Error::Setup("KISSmetrics API key not specified".to_string())
    }

    /// Setup error for recording before `identify` was called
    pub(crate) fn not_identified() -> Self {
        Error::Setup("KISSmetrics user not identified yet".to_string())
    }
}
