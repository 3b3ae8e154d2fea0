//! In-memory persistence collaborator.
//!
//! Rows are kept per record type and keyed by field name, not storage
//! column; identifiers come from a per-table sequence
//! starting at 1. Every accepted request is appended to a write log so
//! callers can inspect exactly what a save sent.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dirtywatch_types::{FieldValue, RecordId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RecordStore, SaveKind, SaveRequest, StoreError, StoreResult, StoredRow};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Table {
    next_id: u64,
    rows: BTreeMap<RecordId, BTreeMap<String, FieldValue>>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Table>,
    log: Vec<SaveRequest>,
}

/// A [`RecordStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of rows stored for `record_type`.
    pub fn len(&self, record_type: &str) -> usize {
        self.lock().tables.get(record_type).map_or(0, |t| t.rows.len())
    }

    pub fn is_empty(&self, record_type: &str) -> bool {
        self.len(record_type) == 0
    }

    /// Requests accepted so far, oldest first.
    pub fn writes(&self) -> Vec<SaveRequest> {
        self.lock().log.clone()
    }

    /// The most recently accepted request.
    pub fn last_write(&self) -> Option<SaveRequest> {
        self.lock().log.last().cloned()
    }

    /// Serializes every table to JSON.
    pub fn dump(&self) -> StoreResult<String> {
        let inner = self.lock();
        let tables: BTreeMap<&String, &Table> = inner.tables.iter().collect();
        Ok(serde_json::to_string_pretty(&tables)?)
    }

    /// Replaces all tables with a previous [`dump`](Self::dump). The write
    /// log is cleared.
    pub fn restore(&self, json: &str) -> StoreResult<()> {
        let tables: HashMap<String, Table> = serde_json::from_str(json)?;
        let mut inner = self.lock();
        inner.tables = tables;
        inner.log.clear();
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, request: &SaveRequest) -> StoreResult<RecordId> {
        if request.kind != SaveKind::Insert || request.id.is_some() {
            return Err(StoreError::InvalidWrite(format!(
                "insert into {} must be an insert without id",
                request.record_type
            )));
        }

        let mut inner = self.lock();
        let table = inner.tables.entry(request.record_type.clone()).or_default();
        table.next_id += 1;
        let id = RecordId::new(table.next_id);
        table.rows.insert(id, request.assignments());
        inner.log.push(request.clone());

        debug!("Inserted {} {} ({} fields)", request.record_type, id, request.values.len());
        Ok(id)
    }

    fn update(&self, request: &SaveRequest) -> StoreResult<()> {
        let id = match (request.kind, request.id) {
            (SaveKind::Update, Some(id)) => id,
            _ => {
                return Err(StoreError::InvalidWrite(format!(
                    "update of {} needs an update request with an id",
                    request.record_type
                )));
            }
        };

        let mut inner = self.lock();
        let row = inner
            .tables
            .get_mut(&request.record_type)
            .and_then(|t| t.rows.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound {
                record_type: request.record_type.clone(),
                id,
            })?;
        row.extend(request.assignments());
        inner.log.push(request.clone());

        debug!(
            "Updated {} {} (dirty: {:?})",
            request.record_type, id, request.dirty
        );
        Ok(())
    }

    fn fetch(&self, record_type: &str, id: RecordId) -> StoreResult<Option<StoredRow>> {
        let inner = self.lock();
        Ok(inner
            .tables
            .get(record_type)
            .and_then(|t| t.rows.get(&id))
            .map(|values| StoredRow {
                id,
                values: values.clone(),
            }))
    }
}
