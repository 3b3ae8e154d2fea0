use std::collections::BTreeMap;
use std::sync::Arc;

use dirtywatch_types::{FieldValue, RecordId, Timestamp};

use crate::{FieldDescriptor, ModelError, ModelResult, RecordSchema};

/// A persistent record: an optional identifier plus one value per schema
/// field.
///
/// Every declared field is always present; unset fields hold
/// [`FieldValue::Null`]. Application code writes through [`Record::set`],
/// which enforces the declared types and refuses managed timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<RecordSchema>,
    id: Option<RecordId>,
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty, never-persisted record.
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| (f.name.clone(), FieldValue::Null))
            .collect();
        Self {
            schema,
            id: None,
            values,
        }
    }

    /// Builds a record from stored values.
    ///
    /// Unlike [`set`](Self::set) this accepts managed timestamps, since they
    /// come back from storage. Fields not mentioned stay `Null`.
    pub fn with_values<K, I>(schema: Arc<RecordSchema>, id: Option<RecordId>, values: I) -> ModelResult<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let mut record = Self::new(schema);
        record.id = id;
        for (name, value) in values {
            record.store(name.as_ref(), value, true)?;
        }
        Ok(record)
    }

    /// Builds a record from a flat JSON object such as
    /// `{"id": 1, "title": "A", "published": false}`.
    ///
    /// The optional `id` key must be a non-negative integer.
    pub fn from_json(schema: Arc<RecordSchema>, json: &serde_json::Value) -> ModelResult<Self> {
        let object = json.as_object().ok_or_else(|| {
            ModelError::InvalidRecord(format!("{} must be a JSON object, got {json}", schema.record_type()))
        })?;

        let mut record = Self::new(schema);
        for (key, raw) in object {
            if key == "id" {
                record.id = match raw {
                    serde_json::Value::Null => None,
                    other => Some(other.as_u64().map(RecordId::new).ok_or_else(|| {
                        ModelError::InvalidRecord(format!("id must be a non-negative integer, got {other}"))
                    })?),
                };
                continue;
            }
            let field_type = record.schema.require(key)?.field_type;
            let value = FieldValue::from_json(field_type, raw)?;
            record.store(key, value, true)?;
        }
        Ok(record)
    }

    /// Flat JSON view of the record, with the identifier under `id`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(
            "id".to_string(),
            self.id.map_or(serde_json::Value::Null, |id| id.get().into()),
        );
        for (field, value) in self.fields() {
            object.insert(field.name.clone(), value.to_json());
        }
        serde_json::Value::Object(object)
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn record_type(&self) -> &str {
        self.schema.record_type()
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Returns true until storage assigns an identifier.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Assigns the storage identifier. Fails if one is already present.
    pub fn assign_id(&mut self, id: RecordId) -> ModelResult<()> {
        if let Some(existing) = self.id {
            return Err(ModelError::IdAlreadyAssigned { id: existing });
        }
        self.id = Some(id);
        Ok(())
    }

    /// Sets a user-mutable field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> ModelResult<()> {
        self.store(name, value.into(), false)
    }

    /// Resets a field to `Null`.
    pub fn clear(&mut self, name: &str) -> ModelResult<()> {
        self.store(name, FieldValue::Null, false)
    }

    /// Writes a managed timestamp. Only the timestamp policy calls this.
    pub(crate) fn write_managed(&mut self, name: &str, at: Timestamp) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = FieldValue::DateTime(at);
        }
    }

    fn store(&mut self, name: &str, value: FieldValue, allow_managed: bool) -> ModelResult<()> {
        let field = self.schema.require(name)?;
        if field.is_managed() && !allow_managed {
            return Err(ModelError::ManagedField {
                field: name.to_string(),
            });
        }
        if !value.conforms_to(field.field_type) {
            return Err(ModelError::TypeMismatch {
                field: name.to_string(),
                expected: field.field_type,
                found: value.to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn get_timestamp(&self, name: &str) -> Option<Timestamp> {
        self.get(name).and_then(FieldValue::as_timestamp)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_float)
    }

    /// Creation timestamp, if the schema declares one and it has been set.
    pub fn created_at(&self) -> Option<Timestamp> {
        self.schema.creation_field().and_then(|f| self.get_timestamp(f))
    }

    /// Update timestamp, if the schema declares one and it has been set.
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.schema.update_field().and_then(|f| self.get_timestamp(f))
    }

    /// Fields and their current values, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .filter_map(|f| self.values.get(&f.name).map(|v| (f, v)))
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }
}
