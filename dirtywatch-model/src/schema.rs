use std::collections::HashMap;

use dirtywatch_types::FieldType;
use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult};

/// Declares a record type's fields and how each one takes part in change
/// detection.
///
/// Schemas are built once per record type and shared behind an `Arc`.
/// Every constructor, including deserialization, validates the field table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef")]
pub struct RecordSchema {
    /// Storage name of the record type (for example the table name).
    record_type: String,
    fields: Vec<FieldDescriptor>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct SchemaDef {
    record_type: String,
    fields: Vec<FieldDescriptor>,
}

impl TryFrom<SchemaDef> for RecordSchema {
    type Error = ModelError;

    fn try_from(def: SchemaDef) -> ModelResult<Self> {
        Self::new(def.record_type, def.fields)
    }
}

impl RecordSchema {
    /// Builds and validates a schema.
    ///
    /// Rejects empty, duplicate or reserved (`id`) field names, managed
    /// fields that are not date-times, and a second creation or update
    /// timestamp.
    pub fn new(record_type: impl Into<String>, fields: Vec<FieldDescriptor>) -> ModelResult<Self> {
        let record_type = record_type.into();
        if record_type.trim().is_empty() {
            return Err(ModelError::InvalidSchema("record type must not be empty".into()));
        }

        let mut index = HashMap::with_capacity(fields.len());
        let mut creation = None;
        let mut update = None;

        for (pos, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(ModelError::InvalidSchema(format!(
                    "{record_type}: field #{pos} has an empty name"
                )));
            }
            if field.name == "id" {
                return Err(ModelError::InvalidSchema(format!(
                    "{record_type}: `id` is reserved for the record identifier"
                )));
            }
            if index.insert(field.name.clone(), pos).is_some() {
                return Err(ModelError::InvalidSchema(format!(
                    "{record_type}: duplicate field {}",
                    field.name
                )));
            }

            let Some(kind) = field.managed else {
                continue;
            };
            if field.field_type != FieldType::DateTime {
                return Err(ModelError::InvalidSchema(format!(
                    "{record_type}: managed field {} must be a date_time, not {}",
                    field.name, field.field_type
                )));
            }
            let slot = match kind {
                ManagedTimestamp::Creation => &mut creation,
                ManagedTimestamp::Update => &mut update,
            };
            if let Some(previous) = slot.replace(field.name.as_str()) {
                return Err(ModelError::InvalidSchema(format!(
                    "{record_type}: both {previous} and {} are {kind:?} timestamps",
                    field.name
                )));
            }
        }

        Ok(Self {
            record_type,
            fields,
            index,
        })
    }

    /// Parses and validates a schema from JSON.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        serde_json::from_str(json).map_err(|e| ModelError::InvalidSchema(e.to_string()))
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&pos| &self.fields[pos])
    }

    /// Like [`field`](Self::field), but an unknown name is an error.
    pub fn require(&self, name: &str) -> ModelResult<&FieldDescriptor> {
        self.field(name).ok_or_else(|| ModelError::unknown_field(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fields that take part in dirty detection.
    pub fn tracked_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_tracked())
    }

    /// Name of the creation timestamp field, if the schema has one.
    pub fn creation_field(&self) -> Option<&str> {
        self.managed_field(ManagedTimestamp::Creation)
    }

    /// Name of the update timestamp field, if the schema has one.
    pub fn update_field(&self) -> Option<&str> {
        self.managed_field(ManagedTimestamp::Update)
    }

    fn managed_field(&self, kind: ManagedTimestamp) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.managed == Some(kind))
            .map(|f| f.name.as_str())
    }
}

/// Metadata for one record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Storage column name when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default)]
    pub tracking: Tracking,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<ManagedTimestamp>,
}

impl FieldDescriptor {
    fn simple(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            column: None,
            tracking: Tracking::Tracked,
            managed: None,
        }
    }

    /// Shorthand for a text field.
    pub fn text(name: &str) -> Self {
        Self::simple(name, FieldType::Text)
    }

    /// Shorthand for a boolean field.
    pub fn bool(name: &str) -> Self {
        Self::simple(name, FieldType::Bool)
    }

    /// Shorthand for a date-time field.
    pub fn datetime(name: &str) -> Self {
        Self::simple(name, FieldType::DateTime)
    }

    /// Shorthand for an integer field.
    pub fn integer(name: &str) -> Self {
        Self::simple(name, FieldType::Integer)
    }

    /// Shorthand for a floating point field.
    pub fn float(name: &str) -> Self {
        Self::simple(name, FieldType::Float)
    }

    /// A date-time populated once, on the first persist.
    pub fn creation_timestamp(name: &str) -> Self {
        Self {
            managed: Some(ManagedTimestamp::Creation),
            ..Self::simple(name, FieldType::DateTime)
        }
    }

    /// A date-time refreshed on every persist.
    pub fn update_timestamp(name: &str) -> Self {
        Self {
            managed: Some(ManagedTimestamp::Update),
            ..Self::simple(name, FieldType::DateTime)
        }
    }

    /// Excludes the field from dirty detection. The value is still stored
    /// and written on insert.
    #[must_use]
    pub fn ignore_dirty(mut self) -> Self {
        self.tracking = Tracking::Ignored;
        self
    }

    /// Sets the storage column name.
    #[must_use]
    pub fn with_column(mut self, column: &str) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Returns true if a change to this field makes the record dirty.
    /// Managed timestamps never do.
    pub fn is_tracked(&self) -> bool {
        self.tracking == Tracking::Tracked && self.managed.is_none()
    }

    pub fn is_managed(&self) -> bool {
        self.managed.is_some()
    }

    /// Storage column, defaulting to the field name.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

/// Whether a field takes part in dirty detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tracking {
    #[default]
    Tracked,
    Ignored,
}

/// Timestamps written by the timestamp policy rather than application code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedTimestamp {
    /// Set once, on the first persist.
    Creation,
    /// Set on every persist, including the first.
    Update,
}
