//! Error types for the session layer.

use dirtywatch_model::ModelError;
use dirtywatch_types::RecordId;
use thiserror::Error;

/// Result type for persistence collaborator operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a [`RecordStore`](crate::RecordStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row with this identifier.
    #[error("record not found: {record_type} {id}")]
    NotFound { record_type: String, id: RecordId },

    /// The write clashes with what storage holds.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request cannot be applied as issued.
    #[error("invalid write: {0}")]
    InvalidWrite(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while hydrating, saving or reloading records.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Schema, tracking or timestamp error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Persistence collaborator error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Load of an identifier the store does not know.
    #[error("record not found: {record_type} {id}")]
    NotFound { record_type: String, id: RecordId },

    /// `RecordHooks::validate` refused the write.
    #[error("rejected: {0}")]
    Rejected(String),
}
