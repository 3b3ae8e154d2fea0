//! Error types for the model layer.

use dirtywatch_types::{FieldType, RecordId};
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by schemas, records, trackers and the timestamp policy.
///
/// All of them describe a caller or schema mistake; none is worth retrying.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The creation timestamp was already populated.
    #[error("{field} is already set")]
    AlreadySet { field: String },

    /// A field name that the schema does not declare.
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// Save cannot tell whether the record is an insert or an update.
    #[error("stale snapshot: {0}")]
    StaleSnapshot(String),

    /// A value whose type does not match the field declaration.
    #[error("type mismatch on {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: String,
    },

    /// Managed timestamps are written by the timestamp policy only.
    #[error("{field} is a managed timestamp and cannot be set directly")]
    ManagedField { field: String },

    /// The record identifier can be assigned once.
    #[error("record already has id {id}")]
    IdAlreadyAssigned { id: RecordId },

    /// A record, snapshot or tracker built for another record type.
    #[error("record type mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    /// Input that cannot be turned into a record at all.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Types(#[from] dirtywatch_types::Error),
}

impl ModelError {
    pub(crate) fn unknown_field(field: &str) -> Self {
        Self::UnknownField {
            field: field.to_string(),
        }
    }
}
