//! Error types for record store operations.
//!
//! ## Error Categories
//! - Connection pool and query errors from the document store
//! - Timeouts on store access
//! - Flat-file read and decode errors
//! - Invalid input handed to a store (e.g. a bad collection name)

use thiserror::Error;

/// Main error type for record store operations.
///
/// Every variant means the store could not answer; none of them represents a
/// normal "no such record" outcome, which stores express with `Option`/empty results.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation error from diesel
    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),

    /// Connection pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// The store did not answer within the configured timeout
    #[error("Store call timed out after {0}s")]
    Timeout(u64),

    /// A stored document could not be decoded into a shop
    #[error("Decode error: {0}")]
    Decode(String),

    /// Flat-file access error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store is known to be down
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    /// Create a new Decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new InvalidInput error with the given message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if this error is due to the store not answering in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Type alias for Results that may fail with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
