//! Hydrate / save / reload orchestration.
//!
//! A [`Session`] pairs a persistence collaborator with a timestamp policy.
//! Each in-memory record travels as a [`TrackedRecord`]: the record plus the
//! one tracker that owns its baseline snapshot.
//!
//! Save decides between insert and update from the record's identifier and
//! baseline, stamps timestamps on a staged copy, and replaces the record and
//! its baseline only after the store accepted the write.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use dirtywatch_model::{
    Clock, DirtySet, Model, ModelError, Record, RecordHooks, RecordSchema, SnapshotTracker, SystemClock,
    TimestampPolicy,
};
use dirtywatch_types::{FieldValue, RecordId};
use tracing::{debug, warn};

use crate::{
    ManagedStamp, ManagedTimestamps, RecordStore, SaveKind, SaveOutcome, SaveRequest, SessionError, SessionResult,
};

/// A record together with its dirty tracker.
#[derive(Debug, Clone)]
pub struct TrackedRecord {
    record: Record,
    tracker: SnapshotTracker,
}

impl TrackedRecord {
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Mutable access for application code. Managed timestamps stay
    /// protected by [`Record::set`].
    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn tracker(&self) -> &SnapshotTracker {
        &self.tracker
    }

    pub fn id(&self) -> Option<RecordId> {
        self.record.id()
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> SessionResult<()> {
        Ok(self.record.set(name, value)?)
    }

    /// Fields changed since the last load or save.
    pub fn dirty(&self) -> SessionResult<DirtySet> {
        Ok(self.tracker.dirty(&self.record)?)
    }

    /// Reads the record back into a typed model.
    pub fn to_model<M: Model>(&self) -> SessionResult<M> {
        Ok(M::from_record(&self.record)?)
    }

    /// Writes a typed model's user fields into the record.
    pub fn apply_model<M: Model>(&mut self, model: &M) -> SessionResult<()> {
        Ok(model.write_to(&mut self.record)?)
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

/// Drives records through the persistence collaborator.
pub struct Session<S, C = SystemClock> {
    store: S,
    policy: TimestampPolicy<C>,
    hooks: HashMap<String, Arc<dyn RecordHooks>>,
}

impl<S: RecordStore> Session<S> {
    /// Session stamping timestamps from the wall clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: RecordStore, C: Clock> Session<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            policy: TimestampPolicy::new(clock),
            hooks: HashMap::new(),
        }
    }

    /// Registers hooks for one record type, replacing earlier ones.
    pub fn register_hooks(&mut self, record_type: impl Into<String>, hooks: Arc<dyn RecordHooks>) {
        self.hooks.insert(record_type.into(), hooks);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &TimestampPolicy<C> {
        &self.policy
    }

    /// A fresh, never-persisted record. Every tracked field is dirty.
    pub fn create(&self, schema: Arc<RecordSchema>) -> TrackedRecord {
        self.track(Record::new(schema))
    }

    /// Starts tracking a record built by application code, without a
    /// baseline.
    pub fn track(&self, record: Record) -> TrackedRecord {
        let tracker = SnapshotTracker::new(Arc::clone(record.schema()));
        TrackedRecord { record, tracker }
    }

    /// Tracks a typed model as a new record.
    pub fn create_model<M: Model>(&self, model: &M) -> SessionResult<TrackedRecord> {
        Ok(self.track(model.to_record()?))
    }

    /// Builds a record from stored values and takes its baseline snapshot.
    pub fn hydrate<K, I>(&self, schema: Arc<RecordSchema>, id: RecordId, values: I) -> SessionResult<TrackedRecord>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let mut record = Record::with_values(schema, Some(id), values)?;
        if let Some(hooks) = self.hooks.get(record.record_type()) {
            hooks.on_after_load(&mut record);
        }
        let tracker = SnapshotTracker::for_record(&record)?;
        debug!("Hydrated {} {}", record.record_type(), id);
        Ok(TrackedRecord { record, tracker })
    }

    /// Fetches a row from the store and hydrates it.
    pub fn load(&self, schema: Arc<RecordSchema>, id: RecordId) -> SessionResult<TrackedRecord> {
        let row = self
            .store
            .fetch(schema.record_type(), id)?
            .ok_or_else(|| SessionError::NotFound {
                record_type: schema.record_type().to_string(),
                id,
            })?;
        self.hydrate(schema, row.id, row.values)
    }

    /// Re-reads the record from the store, replacing values and baseline.
    pub fn reload(&self, tracked: &mut TrackedRecord) -> SessionResult<()> {
        let id = tracked.record.id().ok_or_else(|| {
            ModelError::StaleSnapshot(format!(
                "{} has never been saved and cannot be reloaded",
                tracked.record.record_type()
            ))
        })?;
        *tracked = self.load(Arc::clone(tracked.record.schema()), id)?;
        Ok(())
    }

    /// Computes what a save would send, without writing anything.
    ///
    /// Returns the staged record (timestamps applied) and the request.
    pub fn plan_save(&self, tracked: &TrackedRecord) -> SessionResult<(Record, SaveRequest)> {
        let record = &tracked.record;
        let record_type = record.record_type();

        if let Some(hooks) = self.hooks.get(record_type) {
            hooks.validate(record).map_err(|reason| {
                warn!("Save of {} rejected: {}", record_type, reason);
                SessionError::Rejected(reason)
            })?;
        }

        let kind = match (record.id(), tracked.tracker.has_baseline()) {
            (None, false) => SaveKind::Insert,
            (Some(_), true) => SaveKind::Update,
            (Some(id), false) => {
                return Err(ModelError::StaleSnapshot(format!(
                    "{record_type} {id} has no baseline snapshot; load or hydrate it before saving"
                ))
                .into());
            }
            (None, true) => {
                return Err(ModelError::StaleSnapshot(format!(
                    "{record_type} has a baseline snapshot but no identifier"
                ))
                .into());
            }
        };

        let dirty = tracked.tracker.dirty(record)?;
        let mut staged = record.clone();
        let (created, updated) = match kind {
            SaveKind::Insert => {
                let at = self.policy.stamp_insert(&mut staged)?;
                (Some(at), at)
            }
            SaveKind::Update => (None, self.policy.on_every_persist(&mut staged)),
        };

        let values: BTreeMap<String, FieldValue> = match kind {
            SaveKind::Insert => staged
                .fields()
                .filter(|(field, _)| !field.is_managed())
                .map(|(field, value)| (field.name.clone(), value.clone()))
                .collect(),
            SaveKind::Update => dirty
                .iter()
                .filter_map(|name| staged.get(name).map(|value| (name.clone(), value.clone())))
                .collect(),
        };

        let schema = staged.schema();
        let stamp = |field: Option<&str>, at| field.map(|f| ManagedStamp { field: f.to_string(), at });
        let timestamps = ManagedTimestamps {
            created: created.and_then(|at| stamp(schema.creation_field(), at)),
            updated: stamp(schema.update_field(), updated),
        };
        let columns = schema
            .fields()
            .iter()
            .filter_map(|f| f.column.as_ref().map(|column| (f.name.clone(), column.clone())))
            .collect();

        let request = SaveRequest {
            kind,
            record_type: record_type.to_string(),
            id: record.id(),
            dirty,
            values,
            timestamps,
            columns,
        };
        Ok((staged, request))
    }

    /// Persists the record.
    ///
    /// Inserts a never-saved record (all tracked fields dirty, both
    /// timestamps set to the same instant) or updates a loaded one (dirty
    /// fields only, update timestamp refreshed even when nothing changed).
    /// On failure the tracked record and its baseline are left untouched.
    pub fn save(&self, tracked: &mut TrackedRecord) -> SessionResult<SaveOutcome> {
        let (mut staged, request) = self.plan_save(tracked)?;

        let id = match (request.kind, request.id) {
            (SaveKind::Update, Some(id)) => {
                self.store.update(&request)?;
                id
            }
            _ => {
                let id = self.store.insert(&request)?;
                staged.assign_id(id)?;
                id
            }
        };

        tracked.tracker.reset(&staged)?;
        tracked.record = staged;

        debug!(
            "Saved {} {} ({:?}, dirty: {:?})",
            request.record_type, id, request.kind, request.dirty
        );
        Ok(SaveOutcome {
            id,
            kind: request.kind,
            dirty: request.dirty,
            created_at: tracked.record.created_at(),
            updated_at: tracked.record.updated_at(),
        })
    }
}
