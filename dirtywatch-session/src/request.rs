//! Messages exchanged with the persistence collaborator.

use std::collections::BTreeMap;

use dirtywatch_model::DirtySet;
use dirtywatch_types::{FieldValue, RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// Whether a save creates a row or patches an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveKind {
    Insert,
    Update,
}

/// One managed timestamp written by a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedStamp {
    pub field: String,
    pub at: Timestamp,
}

/// Managed timestamps carried by a save. `created` is only present on
/// insert; `updated` on every save of a schema that declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedTimestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<ManagedStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<ManagedStamp>,
}

/// What the session asks storage to write.
///
/// On update `values` holds exactly the dirty fields. On insert it holds
/// every non-managed field, since the row does not exist yet; fields
/// excluded from dirty tracking still need their initial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub kind: SaveKind,
    pub record_type: String,
    /// `None` on insert; storage assigns the identifier.
    pub id: Option<RecordId>,
    pub dirty: DirtySet,
    pub values: BTreeMap<String, FieldValue>,
    pub timestamps: ManagedTimestamps,
    /// Storage column of every schema field whose column differs from its
    /// name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, String>,
}

impl SaveRequest {
    /// Every field assignment of this request, managed timestamps included.
    pub fn assignments(&self) -> BTreeMap<String, FieldValue> {
        let mut all = self.values.clone();
        for stamp in [&self.timestamps.created, &self.timestamps.updated].into_iter().flatten() {
            all.insert(stamp.field.clone(), FieldValue::DateTime(stamp.at));
        }
        all
    }

    /// [`assignments`](Self::assignments) keyed by storage column.
    pub fn column_assignments(&self) -> BTreeMap<String, FieldValue> {
        self.assignments()
            .into_iter()
            .map(|(field, value)| match self.columns.get(&field) {
                Some(column) => (column.clone(), value),
                None => (field, value),
            })
            .collect()
    }
}

/// A row as storage returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: RecordId,
    pub values: BTreeMap<String, FieldValue>,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub id: RecordId,
    pub kind: SaveKind,
    pub dirty: DirtySet,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}
