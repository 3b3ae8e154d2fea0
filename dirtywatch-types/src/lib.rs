//! Core type definitions for dirtywatch.
//!
//! This crate defines the small, storage-agnostic vocabulary shared by the
//! model and session layers:
//! - Record and snapshot identifiers
//! - Millisecond-precision UTC timestamps
//! - Typed field values and their change-detection equality
//!
//! Schemas, records and trackers live in `dirtywatch-model`.

mod ids;
mod timestamp;
mod value;

pub use ids::{RecordId, SnapshotId};
pub use timestamp::Timestamp;
pub use value::{FieldType, FieldValue};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid {expected} value: {found}")]
    InvalidValue { expected: FieldType, found: String },
}
