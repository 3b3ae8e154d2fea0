use std::sync::Arc;

use dirtywatch_model::{
    DirtySet, FieldDescriptor, Model, ModelError, Record, RecordSchema, Snapshot, SnapshotTracker, Tutorial,
};
use dirtywatch_types::{FieldValue, RecordId, Timestamp};
use pretty_assertions::assert_eq;

fn dirty(names: &[&str]) -> DirtySet {
    names.iter().map(|s| s.to_string()).collect()
}

fn loaded_tutorial(title: &str, published: bool) -> Record {
    Record::with_values(
        Tutorial::schema(),
        Some(RecordId::new(1)),
        [
            (Tutorial::TITLE, FieldValue::from(title)),
            (Tutorial::DESCRIPTION, FieldValue::from("x")),
            (Tutorial::PUBLISHED, FieldValue::from(published)),
        ],
    )
    .unwrap()
}

// ── take_snapshot ────────────────────────────────────────────────

#[test]
fn snapshot_captures_tracked_fields_only() {
    let record = loaded_tutorial("A", true);
    let tracker = SnapshotTracker::new(Tutorial::schema());
    let snapshot = tracker.take_snapshot(&record).unwrap();

    let names: Vec<_> = snapshot.values().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["description", "title"]);
    assert_eq!(snapshot.get(Tutorial::TITLE), Some(&FieldValue::from("A")));
    assert_eq!(snapshot.record_id(), Some(RecordId::new(1)));
    assert_eq!(snapshot.record_type(), "tutorials");
}

#[test]
fn take_snapshot_has_no_side_effects() {
    let record = loaded_tutorial("A", true);
    let copy = record.clone();
    let tracker = SnapshotTracker::new(Tutorial::schema());
    tracker.take_snapshot(&record).unwrap();
    assert_eq!(record, copy);
    assert!(!tracker.has_baseline());
}

#[test]
fn each_snapshot_gets_a_new_id() {
    let record = loaded_tutorial("A", true);
    let tracker = SnapshotTracker::new(Tutorial::schema());
    let a = tracker.take_snapshot(&record).unwrap();
    let b = tracker.take_snapshot(&record).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a.values(), b.values());
}

// ── compute_dirty ────────────────────────────────────────────────

#[test]
fn no_snapshot_means_all_tracked_fields_dirty() {
    let record = Tutorial::new("A", "x", false).to_record().unwrap();
    let tracker = SnapshotTracker::new(Tutorial::schema());
    assert_eq!(
        tracker.compute_dirty(&record, None).unwrap(),
        dirty(&["description", "title"])
    );
}

#[test]
fn unchanged_record_is_clean() {
    let record = loaded_tutorial("A", false);
    let tracker = SnapshotTracker::for_record(&record).unwrap();
    assert_eq!(tracker.dirty(&record).unwrap(), DirtySet::new());
    assert!(!tracker.is_dirty(&record).unwrap());
}

#[test]
fn title_change_then_reset() {
    let mut record = loaded_tutorial("A", false);
    let mut tracker = SnapshotTracker::new(Tutorial::schema());
    let snapshot = Snapshot::from_values("tutorials", record.id(), [(Tutorial::TITLE, FieldValue::from("A"))]);

    record.set(Tutorial::TITLE, "B").unwrap();
    let changed = tracker.compute_dirty(&record, Some(&snapshot)).unwrap();
    assert!(changed.contains(Tutorial::TITLE));

    tracker.reset(&record).unwrap();
    assert_eq!(tracker.dirty(&record).unwrap(), DirtySet::new());
}

#[test]
fn title_change_against_full_baseline() {
    let mut record = loaded_tutorial("A", false);
    let tracker = SnapshotTracker::for_record(&record).unwrap();
    record.set(Tutorial::TITLE, "B").unwrap();
    assert_eq!(tracker.dirty(&record).unwrap(), dirty(&["title"]));
}

#[test]
fn excluded_field_change_is_never_dirty() {
    let mut record = loaded_tutorial("A", true);
    let tracker = SnapshotTracker::for_record(&record).unwrap();
    record.set(Tutorial::PUBLISHED, false).unwrap();
    assert_eq!(record.get_bool(Tutorial::PUBLISHED), Some(false));
    assert_eq!(tracker.dirty(&record).unwrap(), DirtySet::new());
}

#[test]
fn reverting_a_change_is_clean() {
    let mut record = loaded_tutorial("A", false);
    let tracker = SnapshotTracker::for_record(&record).unwrap();
    record.set(Tutorial::TITLE, "B").unwrap();
    record.set(Tutorial::TITLE, "A").unwrap();
    assert!(!tracker.is_dirty(&record).unwrap());
}

#[test]
fn tracked_field_missing_from_snapshot_is_dirty() {
    let record = loaded_tutorial("A", false);
    let tracker = SnapshotTracker::new(Tutorial::schema());
    let partial = Snapshot::from_values("tutorials", record.id(), [(Tutorial::TITLE, FieldValue::from("A"))]);
    assert_eq!(
        tracker.compute_dirty(&record, Some(&partial)).unwrap(),
        dirty(&["description"])
    );
}

#[test]
fn unknown_snapshot_field_is_an_error() {
    let record = loaded_tutorial("A", false);
    let tracker = SnapshotTracker::new(Tutorial::schema());
    let bad = Snapshot::from_values("tutorials", None, [("author", FieldValue::from("me"))]);
    match tracker.compute_dirty(&record, Some(&bad)) {
        Err(ModelError::UnknownField { field }) => assert_eq!(field, "author"),
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

#[test]
fn compute_dirty_does_not_mutate_inputs() {
    let mut record = loaded_tutorial("A", false);
    let tracker = SnapshotTracker::for_record(&record).unwrap();
    let baseline = tracker.baseline().unwrap().clone();
    record.set(Tutorial::TITLE, "B").unwrap();
    let before = record.clone();

    let first = tracker.dirty(&record).unwrap();
    let second = tracker.dirty(&record).unwrap();
    assert_eq!(first, second);
    assert_eq!(record, before);
    assert_eq!(tracker.baseline().unwrap(), &baseline);
}

#[test]
fn date_time_compared_by_instant() {
    let schema = Arc::new(RecordSchema::new("events", vec![FieldDescriptor::datetime("at")]).unwrap());
    let mut record = Record::new(Arc::clone(&schema));
    record.set("at", Timestamp::parse("2024-06-01T12:00:00+02:00").unwrap()).unwrap();
    let tracker = SnapshotTracker::for_record(&record).unwrap();

    record.set("at", Timestamp::parse("2024-06-01T10:00:00Z").unwrap()).unwrap();
    assert!(!tracker.is_dirty(&record).unwrap());

    record.set("at", Timestamp::parse("2024-06-01T10:00:00.001Z").unwrap()).unwrap();
    assert!(tracker.is_dirty(&record).unwrap());
}

#[test]
fn null_to_value_is_dirty() {
    let schema = Arc::new(RecordSchema::new("n", vec![FieldDescriptor::integer("count")]).unwrap());
    let mut record = Record::new(schema);
    let tracker = SnapshotTracker::for_record(&record).unwrap();
    record.set("count", 0i64).unwrap();
    assert_eq!(tracker.dirty(&record).unwrap(), dirty(&["count"]));
}

// ── Schema checks ────────────────────────────────────────────────

#[test]
fn record_of_other_type_is_rejected() {
    let other = Arc::new(RecordSchema::new("other", vec![FieldDescriptor::text("title")]).unwrap());
    let record = Record::new(other);
    let tracker = SnapshotTracker::new(Tutorial::schema());
    assert!(matches!(
        tracker.dirty(&record),
        Err(ModelError::SchemaMismatch { .. })
    ));
    assert!(matches!(
        tracker.take_snapshot(&record),
        Err(ModelError::SchemaMismatch { .. })
    ));
}

#[test]
fn with_baseline_validates_snapshot() {
    let good = Snapshot::from_values("tutorials", None, [(Tutorial::TITLE, FieldValue::from("A"))]);
    assert!(SnapshotTracker::with_baseline(Tutorial::schema(), good).is_ok());

    let wrong_type = Snapshot::from_values("posts", None, Vec::<(String, FieldValue)>::new());
    assert!(matches!(
        SnapshotTracker::with_baseline(Tutorial::schema(), wrong_type),
        Err(ModelError::SchemaMismatch { .. })
    ));

    let unknown = Snapshot::from_values("tutorials", None, [("author", FieldValue::Null)]);
    assert!(matches!(
        SnapshotTracker::with_baseline(Tutorial::schema(), unknown),
        Err(ModelError::UnknownField { .. })
    ));
}

// ── reset ────────────────────────────────────────────────────────

#[test]
fn reset_replaces_baseline() {
    let mut record = loaded_tutorial("A", false);
    let mut tracker = SnapshotTracker::for_record(&record).unwrap();
    let first = tracker.baseline().unwrap().id();

    record.set(Tutorial::DESCRIPTION, "y").unwrap();
    tracker.reset(&record).unwrap();

    let second = tracker.baseline().unwrap();
    assert_ne!(second.id(), first);
    assert_eq!(second.get(Tutorial::DESCRIPTION), Some(&FieldValue::from("y")));
}
