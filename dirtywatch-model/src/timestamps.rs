//! Managed creation and update timestamps.
//!
//! The policy is applied explicitly around a save:
//! - [`TimestampPolicy::on_first_persist`] once, on insert
//! - [`TimestampPolicy::on_every_persist`] on every save, insert included
//!
//! Neither touches dirty tracking: managed fields are never tracked.

use std::sync::{Arc, Mutex, PoisonError};

use dirtywatch_types::Timestamp;

use crate::{ModelError, ModelResult, Record};

/// Source of "now" for managed timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock, millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, at: Timestamp) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Moves the clock forward by `millis` and returns the new instant.
    pub fn advance_millis(&self, millis: i64) -> ModelResult<Timestamp> {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.add_millis(millis)?;
        Ok(*now)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Stamps the schema's creation and update fields.
///
/// Schemas without one of the managed fields are accepted; the matching
/// call then only returns the instant it would have written.
#[derive(Debug, Clone, Default)]
pub struct TimestampPolicy<C = SystemClock> {
    clock: C,
}

impl TimestampPolicy<SystemClock> {
    /// Policy backed by the wall clock.
    pub fn system() -> Self {
        Self::default()
    }
}

impl<C: Clock> TimestampPolicy<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Sets the creation timestamp to now.
    ///
    /// Fails with [`ModelError::AlreadySet`] if the record already has one,
    /// which guards against inserting the same record twice.
    pub fn on_first_persist(&self, record: &mut Record) -> ModelResult<Timestamp> {
        self.on_first_persist_at(record, self.clock.now())
    }

    pub fn on_first_persist_at(&self, record: &mut Record, at: Timestamp) -> ModelResult<Timestamp> {
        let Some(field) = record.schema().creation_field().map(str::to_owned) else {
            return Ok(at);
        };
        if record.get(&field).is_some_and(|v| !v.is_null()) {
            return Err(ModelError::AlreadySet { field });
        }
        record.write_managed(&field, at);
        Ok(at)
    }

    /// Sets the update timestamp to now, unconditionally.
    pub fn on_every_persist(&self, record: &mut Record) -> Timestamp {
        self.on_every_persist_at(record, self.clock.now())
    }

    pub fn on_every_persist_at(&self, record: &mut Record, at: Timestamp) -> Timestamp {
        if let Some(field) = record.schema().update_field().map(str::to_owned) {
            record.write_managed(&field, at);
        }
        at
    }

    /// Applies both stamps of a first save from a single clock reading, so
    /// creation and update times are equal.
    pub fn stamp_insert(&self, record: &mut Record) -> ModelResult<Timestamp> {
        let at = self.clock.now();
        self.on_first_persist_at(record, at)?;
        Ok(self.on_every_persist_at(record, at))
    }
}
