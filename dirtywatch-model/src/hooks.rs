use crate::Record;

/// Optional callbacks for record types that need validation or post-load
/// processing.
///
/// Most record types do NOT need this; the session handles tracking and
/// timestamps from the schema alone.
pub trait RecordHooks: Send + Sync {
    /// Validate a record before it is persisted.
    /// Return `Err(message)` to reject the write.
    fn validate(&self, record: &Record) -> Result<(), String> {
        let _ = record;
        Ok(())
    }

    /// Called after a record is hydrated from storage, before its baseline
    /// snapshot is taken. Changes made here are therefore not dirty.
    fn on_after_load(&self, record: &mut Record) {
        let _ = record;
    }
}
