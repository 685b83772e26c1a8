//! Typed errors for the directory library.
//!
//! Validation, precondition and not-found errors carry a human-readable
//! message that callers surface verbatim.

use thiserror::Error;

use crate::common::LocationId;

/// Errors raised by the document store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query needs a composite index the store has not built.
    #[error("query requires a composite index: {0}")]
    MissingIndex(String),

    /// Compare-and-set write lost against a concurrent writer
    #[error("version mismatch for {id}: expected {expected}, found {actual}")]
    VersionMismatch {
        id: String,
        expected: u64,
        actual: u64,
    },

    /// Record addressed by a write does not exist
    #[error("record not found: {0}")]
    NotFound(String),

    /// Backend unavailable or failed
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Document (de)serialization failed
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into().into())
    }
}

/// Errors returned by directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Bad or missing arguments, parent type mismatch, blocked type change
    #[error("{0}")]
    Validation(String),

    /// Write attempted without network connectivity
    #[error("You are offline. Connect to the internet and try again.")]
    Offline,

    #[error("Location not found: {id}")]
    NotFound { id: LocationId },

    /// Stale optimistic version stamp
    #[error("Location {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        id: LocationId,
        expected: u64,
        actual: u64,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DirectoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        DirectoryError::Validation(message.into())
    }

    /// Whether the caller should show this error to the user as-is.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, DirectoryError::Store(_))
    }
}

/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
