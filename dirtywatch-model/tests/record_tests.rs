use std::sync::Arc;

use dirtywatch_model::{FieldDescriptor, ModelError, Record, RecordSchema};
use dirtywatch_types::{FieldValue, RecordId, Timestamp};
use serde_json::json;

fn schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::new(
            "notes",
            vec![
                FieldDescriptor::text("title"),
                FieldDescriptor::bool("pinned").ignore_dirty(),
                FieldDescriptor::integer("views"),
                FieldDescriptor::float("score"),
                FieldDescriptor::datetime("due"),
                FieldDescriptor::creation_timestamp("created"),
                FieldDescriptor::update_timestamp("updated"),
            ],
        )
        .unwrap(),
    )
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_record_has_every_field_null() {
    let record = Record::new(schema());
    assert!(record.is_new());
    assert_eq!(record.id(), None);
    assert_eq!(record.values().len(), 7);
    assert!(record.values().values().all(FieldValue::is_null));
    assert_eq!(record.record_type(), "notes");
}

#[test]
fn with_values_accepts_managed_fields() {
    let ts = Timestamp::from_millis(1_000).unwrap();
    let record = Record::with_values(
        schema(),
        Some(RecordId::new(3)),
        [("title", FieldValue::from("Hi")), ("created", FieldValue::from(ts))],
    )
    .unwrap();
    assert_eq!(record.id(), Some(RecordId::new(3)));
    assert_eq!(record.get_str("title"), Some("Hi"));
    assert_eq!(record.created_at(), Some(ts));
    assert_eq!(record.updated_at(), None);
    assert_eq!(record.get("views"), Some(&FieldValue::Null));
}

#[test]
fn with_values_rejects_unknown_field() {
    let err = Record::with_values(schema(), None, [("nope", FieldValue::from(1i64))]).unwrap_err();
    assert!(matches!(err, ModelError::UnknownField { field } if field == "nope"));
}

// ── set ──────────────────────────────────────────────────────────

#[test]
fn set_and_typed_getters() {
    let mut record = Record::new(schema());
    let due = Timestamp::from_millis(5_000).unwrap();
    record.set("title", "Groceries").unwrap();
    record.set("pinned", true).unwrap();
    record.set("views", 12i64).unwrap();
    record.set("score", 4.5).unwrap();
    record.set("due", due).unwrap();

    assert_eq!(record.get_str("title"), Some("Groceries"));
    assert_eq!(record.get_bool("pinned"), Some(true));
    assert_eq!(record.get_integer("views"), Some(12));
    assert_eq!(record.get_float("score"), Some(4.5));
    assert_eq!(record.get_timestamp("due"), Some(due));
}

#[test]
fn typed_getters_return_none_for_other_types() {
    let mut record = Record::new(schema());
    record.set("title", "x").unwrap();
    assert_eq!(record.get_bool("title"), None);
    assert_eq!(record.get_str("missing"), None);
}

#[test]
fn set_rejects_type_mismatch() {
    let mut record = Record::new(schema());
    match record.set("views", "many") {
        Err(ModelError::TypeMismatch { field, expected, .. }) => {
            assert_eq!(field, "views");
            assert_eq!(expected, dirtywatch_types::FieldType::Integer);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    assert_eq!(record.get("views"), Some(&FieldValue::Null));
}

#[test]
fn set_rejects_unknown_field() {
    let mut record = Record::new(schema());
    assert!(matches!(
        record.set("author", "me"),
        Err(ModelError::UnknownField { .. })
    ));
}

#[test]
fn set_rejects_managed_field() {
    let mut record = Record::new(schema());
    let result = record.set("created", Timestamp::now());
    assert!(matches!(result, Err(ModelError::ManagedField { field }) if field == "created"));
    assert_eq!(record.created_at(), None);
}

#[test]
fn clear_sets_null() {
    let mut record = Record::new(schema());
    record.set("title", "x").unwrap();
    record.clear("title").unwrap();
    assert_eq!(record.get("title"), Some(&FieldValue::Null));
}

// ── Identifier ───────────────────────────────────────────────────

#[test]
fn assign_id_once() {
    let mut record = Record::new(schema());
    record.assign_id(RecordId::new(1)).unwrap();
    assert!(!record.is_new());

    let err = record.assign_id(RecordId::new(2)).unwrap_err();
    assert!(matches!(err, ModelError::IdAlreadyAssigned { id } if id == RecordId::new(1)));
    assert_eq!(record.id(), Some(RecordId::new(1)));
}

// ── JSON ─────────────────────────────────────────────────────────

#[test]
fn from_json_reads_id_and_fields() {
    let record = Record::from_json(
        schema(),
        &json!({"id": 9, "title": "A", "pinned": false, "created": "2024-01-01T00:00:00Z"}),
    )
    .unwrap();
    assert_eq!(record.id(), Some(RecordId::new(9)));
    assert_eq!(record.get_str("title"), Some("A"));
    assert_eq!(record.get_bool("pinned"), Some(false));
    assert!(record.created_at().is_some());
}

#[test]
fn from_json_rejects_non_object() {
    assert!(matches!(
        Record::from_json(schema(), &json!([1, 2])),
        Err(ModelError::InvalidRecord(_))
    ));
}

#[test]
fn from_json_rejects_bad_id() {
    assert!(matches!(
        Record::from_json(schema(), &json!({"id": "x"})),
        Err(ModelError::InvalidRecord(_))
    ));
}

#[test]
fn from_json_rejects_bad_value() {
    assert!(matches!(
        Record::from_json(schema(), &json!({"views": "lots"})),
        Err(ModelError::Types(_))
    ));
}

#[test]
fn to_json_includes_id_and_all_fields() {
    let mut record = Record::new(schema());
    record.set("title", "A").unwrap();
    let value = record.to_json();
    assert_eq!(value["id"], json!(null));
    assert_eq!(value["title"], json!("A"));
    assert_eq!(value["views"], json!(null));
    assert_eq!(value.as_object().unwrap().len(), 8);
}

#[test]
fn fields_iterate_in_declaration_order() {
    let record = Record::new(schema());
    let names: Vec<_> = record.fields().map(|(f, _)| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["title", "pinned", "views", "score", "due", "created", "updated"]
    );
}
