//! Snapshot-based dirty tracking.
//!
//! A [`SnapshotTracker`] belongs to exactly one in-memory [`Record`]. It
//! keeps the baseline captured at load or last save and reports which tracked
//! fields differ from it. Fields marked [`Tracking::Ignored`] and managed
//! timestamps never show up, even when their values changed.
//!
//! [`Tracking::Ignored`]: crate::Tracking::Ignored

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::{ModelError, ModelResult, Record, RecordSchema, Snapshot};

/// Names of the fields that changed, sorted.
pub type DirtySet = BTreeSet<String>;

/// Compares a record against its last persisted state.
///
/// Not synchronized; callers that share a record across threads must guard
/// the record and its tracker together.
#[derive(Debug, Clone)]
pub struct SnapshotTracker {
    schema: Arc<RecordSchema>,
    baseline: Option<Snapshot>,
}

impl SnapshotTracker {
    /// Creates a tracker with no baseline. Everything tracked is dirty until
    /// the first [`reset`](Self::reset).
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        Self {
            schema,
            baseline: None,
        }
    }

    /// Creates a tracker whose baseline is the current state of `record`.
    pub fn for_record(record: &Record) -> ModelResult<Self> {
        let mut tracker = Self::new(Arc::clone(record.schema()));
        tracker.reset(record)?;
        Ok(tracker)
    }

    /// Creates a tracker from an externally captured baseline.
    pub fn with_baseline(schema: Arc<RecordSchema>, baseline: Snapshot) -> ModelResult<Self> {
        check_type(&schema, baseline.record_type())?;
        if let Some(unknown) = baseline.values().keys().find(|name| !schema.contains(name)) {
            return Err(ModelError::unknown_field(unknown));
        }
        Ok(Self {
            schema,
            baseline: Some(baseline),
        })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Captures the current values of every tracked field. Does not touch
    /// the record or the stored baseline.
    pub fn take_snapshot(&self, record: &Record) -> ModelResult<Snapshot> {
        check_type(&self.schema, record.record_type())?;
        Ok(Snapshot::capture(record))
    }

    /// Computes the tracked fields of `record` that differ from `snapshot`.
    ///
    /// With no snapshot every tracked field is dirty (the record has never
    /// been stored). A tracked field missing from the snapshot is dirty.
    /// A snapshot entry the schema does not declare is an
    /// [`UnknownField`](ModelError::UnknownField) error.
    pub fn compute_dirty(&self, record: &Record, snapshot: Option<&Snapshot>) -> ModelResult<DirtySet> {
        check_type(&self.schema, record.record_type())?;

        let Some(snapshot) = snapshot else {
            return Ok(self.schema.tracked_fields().map(|f| f.name.clone()).collect());
        };

        check_type(&self.schema, snapshot.record_type())?;
        if let Some(unknown) = snapshot.values().keys().find(|name| !self.schema.contains(name)) {
            return Err(ModelError::unknown_field(unknown));
        }

        let mut dirty = DirtySet::new();
        for field in self.schema.tracked_fields() {
            let current = record
                .get(&field.name)
                .ok_or_else(|| ModelError::unknown_field(&field.name))?;
            let changed = snapshot
                .get(&field.name)
                .is_none_or(|previous| !previous.same_as(current));
            if changed {
                dirty.insert(field.name.clone());
            }
        }
        Ok(dirty)
    }

    /// Dirty fields relative to the stored baseline.
    pub fn dirty(&self, record: &Record) -> ModelResult<DirtySet> {
        self.compute_dirty(record, self.baseline.as_ref())
    }

    pub fn is_dirty(&self, record: &Record) -> ModelResult<bool> {
        Ok(!self.dirty(record)?.is_empty())
    }

    /// Replaces the baseline with a fresh capture of `record`. Called after
    /// a successful save or reload.
    pub fn reset(&mut self, record: &Record) -> ModelResult<()> {
        let snapshot = self.take_snapshot(record)?;
        debug!(
            "Baseline for {} {:?} replaced by snapshot {}",
            record.record_type(),
            record.id(),
            snapshot.id()
        );
        self.baseline = Some(snapshot);
        Ok(())
    }

    pub fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.as_ref()
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }
}

fn check_type(schema: &RecordSchema, found: &str) -> ModelResult<()> {
    if schema.record_type() == found {
        Ok(())
    } else {
        Err(ModelError::SchemaMismatch {
            expected: schema.record_type().to_string(),
            found: found.to_string(),
        })
    }
}
