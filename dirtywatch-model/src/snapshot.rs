use std::collections::BTreeMap;

use dirtywatch_types::{FieldValue, RecordId, SnapshotId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::Record;

/// Field values of a record captured at one point in time.
///
/// A snapshot never changes after capture. Trackers replace their baseline
/// with a new snapshot instead of editing the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    id: SnapshotId,
    record_type: String,
    record_id: Option<RecordId>,
    taken_at: Timestamp,
    values: BTreeMap<String, FieldValue>,
}

impl Snapshot {
    /// Captures the tracked fields of `record`.
    pub(crate) fn capture(record: &Record) -> Self {
        let values = record
            .fields()
            .filter(|(field, _)| field.is_tracked())
            .map(|(field, value)| (field.name.clone(), value.clone()))
            .collect();
        Self {
            id: SnapshotId::new(),
            record_type: record.record_type().to_string(),
            record_id: record.id(),
            taken_at: Timestamp::now(),
            values,
        }
    }

    /// Builds a snapshot from values a caller already holds, for example
    /// the row a persistence layer just read.
    pub fn from_values<K, I>(record_type: impl Into<String>, record_id: Option<RecordId>, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        Self {
            id: SnapshotId::new(),
            record_type: record_type.into(),
            record_id,
            taken_at: Timestamp::now(),
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Identifier of the record at capture time (`None` before first insert).
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn taken_at(&self) -> Timestamp {
        self.taken_at
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
