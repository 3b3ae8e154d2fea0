use std::sync::Arc;

use dirtywatch_model::{
    Clock, FieldDescriptor, ManualClock, Model, ModelError, Record, RecordSchema, SystemClock, TimestampPolicy,
    Tutorial,
};
use dirtywatch_types::Timestamp;

fn start() -> Timestamp {
    Timestamp::parse("2024-05-01T08:00:00Z").unwrap()
}

fn manual_policy() -> (Arc<ManualClock>, TimestampPolicy<Arc<ManualClock>>) {
    let clock = Arc::new(ManualClock::new(start()));
    (Arc::clone(&clock), TimestampPolicy::new(clock))
}

fn fresh_tutorial() -> Record {
    Tutorial::new("A", "x", false).to_record().unwrap()
}

// ── Clocks ───────────────────────────────────────────────────────

#[test]
fn system_clock_moves_forward() {
    let a = SystemClock.now();
    let b = SystemClock.now();
    assert!(a <= b);
}

#[test]
fn manual_clock_set_and_advance() {
    let clock = ManualClock::new(start());
    assert_eq!(clock.now(), start());
    let later = clock.advance_millis(1_500).unwrap();
    assert_eq!(later.as_millis(), start().as_millis() + 1_500);
    assert_eq!(clock.now(), later);

    clock.set(start());
    assert_eq!(clock.now(), start());
}

#[test]
fn manual_clock_advance_out_of_range() {
    let clock = ManualClock::new(start());
    assert!(clock.advance_millis(i64::MAX).is_err());
    assert_eq!(clock.now(), start());
}

// ── on_first_persist ─────────────────────────────────────────────

#[test]
fn first_persist_sets_creation_time() {
    let (_, policy) = manual_policy();
    let mut record = fresh_tutorial();
    let at = policy.on_first_persist(&mut record).unwrap();
    assert_eq!(at, start());
    assert_eq!(record.created_at(), Some(start()));
    assert_eq!(record.updated_at(), None);
}

#[test]
fn first_persist_twice_fails() {
    let (clock, policy) = manual_policy();
    let mut record = fresh_tutorial();
    policy.on_first_persist(&mut record).unwrap();
    clock.advance_millis(10).unwrap();

    match policy.on_first_persist(&mut record) {
        Err(ModelError::AlreadySet { field }) => assert_eq!(field, Tutorial::CREATED_DATE),
        other => panic!("expected AlreadySet, got {other:?}"),
    }
    assert_eq!(record.created_at(), Some(start()));
}

#[test]
fn first_persist_on_hydrated_record_fails() {
    let (_, policy) = manual_policy();
    let mut record = Record::with_values(
        Tutorial::schema(),
        None,
        [(Tutorial::CREATED_DATE, dirtywatch_types::FieldValue::from(start()))],
    )
    .unwrap();
    assert!(matches!(
        policy.on_first_persist(&mut record),
        Err(ModelError::AlreadySet { .. })
    ));
}

// ── on_every_persist ─────────────────────────────────────────────

#[test]
fn every_persist_updates_each_call() {
    let (clock, policy) = manual_policy();
    let mut record = fresh_tutorial();

    let first = policy.on_every_persist(&mut record);
    assert_eq!(record.updated_at(), Some(first));

    clock.advance_millis(1_000).unwrap();
    let second = policy.on_every_persist(&mut record);
    assert!(second.is_after(&first));
    assert_eq!(record.updated_at(), Some(second));
}

#[test]
fn every_persist_right_after_first_persist() {
    let (clock, policy) = manual_policy();
    let mut record = fresh_tutorial();
    policy.on_first_persist(&mut record).unwrap();
    clock.advance_millis(1).unwrap();
    let updated = policy.on_every_persist(&mut record);

    assert_eq!(record.updated_at(), Some(updated));
    assert_eq!(record.created_at(), Some(start()));
}

#[test]
fn stamp_insert_sets_equal_timestamps() {
    let (_, policy) = manual_policy();
    let mut record = fresh_tutorial();
    let at = policy.stamp_insert(&mut record).unwrap();
    assert_eq!(record.created_at(), Some(at));
    assert_eq!(record.updated_at(), Some(at));
}

#[test]
fn stamp_insert_with_system_clock_sets_equal_timestamps() {
    let policy = TimestampPolicy::system();
    let mut record = fresh_tutorial();
    policy.stamp_insert(&mut record).unwrap();
    assert!(record.created_at().is_some());
    assert_eq!(record.created_at(), record.updated_at());
}

#[test]
fn explicit_instant_variants() {
    let policy = TimestampPolicy::system();
    let mut record = fresh_tutorial();
    policy.on_first_persist_at(&mut record, start()).unwrap();
    policy.on_every_persist_at(&mut record, start());
    assert_eq!(record.created_at(), Some(start()));
    assert_eq!(record.updated_at(), Some(start()));
}

// ── Schemas without managed fields ───────────────────────────────

#[test]
fn schema_without_managed_fields_is_a_noop() {
    let schema = Arc::new(RecordSchema::new("plain", vec![FieldDescriptor::text("a")]).unwrap());
    let mut record = Record::new(schema);
    let before = record.clone();
    let (_, policy) = manual_policy();

    assert_eq!(policy.on_first_persist(&mut record).unwrap(), start());
    assert_eq!(policy.on_first_persist(&mut record).unwrap(), start());
    assert_eq!(policy.on_every_persist(&mut record), start());
    assert_eq!(record, before);
}
