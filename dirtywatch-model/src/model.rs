use std::sync::Arc;

use crate::{ModelResult, Record, RecordSchema};

/// A typed entity backed by a [`Record`].
///
/// Implementors declare their schema once and convert to and from the
/// dynamic record that the tracker and session operate on.
pub trait Model: Sized {
    /// The shared schema of this entity type.
    fn schema() -> Arc<RecordSchema>;

    /// Writes the user-mutable fields into `record`. Identifier and managed
    /// timestamps are left alone.
    fn write_to(&self, record: &mut Record) -> ModelResult<()>;

    /// Reads an entity, identifier and timestamps included, from a record.
    fn from_record(record: &Record) -> ModelResult<Self>;

    /// A fresh, never-persisted record holding this entity's values.
    fn to_record(&self) -> ModelResult<Record> {
        let mut record = Record::new(Self::schema());
        self.write_to(&mut record)?;
        Ok(record)
    }
}
