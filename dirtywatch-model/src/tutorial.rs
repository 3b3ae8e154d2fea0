//! The `Tutorial` entity.
//!
//! Stored in the `tutorials` table. `published` is excluded from dirty
//! tracking, `created_date` and `update_date` are managed timestamps.
//! `title` and `description` are nullable columns.

use std::sync::{Arc, OnceLock};

use dirtywatch_types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{FieldDescriptor, Model, ModelError, ModelResult, Record, RecordSchema};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutorial {
    id: Option<RecordId>,
    title: Option<String>,
    description: Option<String>,
    published: bool,
    created_date: Option<Timestamp>,
    update_date: Option<Timestamp>,
}

impl Tutorial {
    pub const RECORD_TYPE: &'static str = "tutorials";
    pub const TITLE: &'static str = "title";
    pub const DESCRIPTION: &'static str = "description";
    pub const PUBLISHED: &'static str = "published";
    pub const CREATED_DATE: &'static str = "created_date";
    pub const UPDATE_DATE: &'static str = "update_date";

    pub fn new(title: impl Into<String>, description: impl Into<String>, published: bool) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            published,
            ..Self::default()
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn clear_title(&mut self) {
        self.title = None;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn clear_description(&mut self) {
        self.description = None;
    }

    pub fn is_published(&self) -> bool {
        self.published
    }

    pub fn set_published(&mut self, published: bool) {
        self.published = published;
    }

    pub fn created_date(&self) -> Option<Timestamp> {
        self.created_date
    }

    pub fn update_date(&self) -> Option<Timestamp> {
        self.update_date
    }
}

impl Model for Tutorial {
    fn schema() -> Arc<RecordSchema> {
        static SCHEMA: OnceLock<Arc<RecordSchema>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                let schema = RecordSchema::new(
                    Tutorial::RECORD_TYPE,
                    vec![
                        FieldDescriptor::text(Tutorial::TITLE),
                        FieldDescriptor::text(Tutorial::DESCRIPTION),
                        FieldDescriptor::bool(Tutorial::PUBLISHED).ignore_dirty(),
                        FieldDescriptor::creation_timestamp(Tutorial::CREATED_DATE),
                        FieldDescriptor::update_timestamp(Tutorial::UPDATE_DATE),
                    ],
                )
                .expect("tutorial schema is valid");
                Arc::new(schema)
            })
            .clone()
    }

    fn write_to(&self, record: &mut Record) -> ModelResult<()> {
        record.set(Self::TITLE, self.title.as_deref())?;
        record.set(Self::DESCRIPTION, self.description.as_deref())?;
        record.set(Self::PUBLISHED, self.published)?;
        Ok(())
    }

    fn from_record(record: &Record) -> ModelResult<Self> {
        if record.record_type() != Self::RECORD_TYPE {
            return Err(ModelError::SchemaMismatch {
                expected: Self::RECORD_TYPE.to_string(),
                found: record.record_type().to_string(),
            });
        }
        Ok(Self {
            id: record.id(),
            title: record.get_str(Self::TITLE).map(str::to_owned),
            description: record.get_str(Self::DESCRIPTION).map(str::to_owned),
            published: record.get_bool(Self::PUBLISHED).unwrap_or(false),
            created_date: record.get_timestamp(Self::CREATED_DATE),
            update_date: record.get_timestamp(Self::UPDATE_DATE),
        })
    }
}
