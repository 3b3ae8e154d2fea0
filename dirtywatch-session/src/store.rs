use std::sync::Arc;

use dirtywatch_types::RecordId;

use crate::{SaveRequest, StoreResult, StoredRow};

/// The persistence collaborator.
///
/// Implementations turn [`SaveRequest`]s into whatever durable write they
/// use (SQL, document patch, key-value put) and own identifier generation
/// and transactional guarantees.
pub trait RecordStore: Send + Sync {
    /// Creates a row and returns its new identifier.
    fn insert(&self, request: &SaveRequest) -> StoreResult<RecordId>;

    /// Applies the request's assignments to an existing row.
    fn update(&self, request: &SaveRequest) -> StoreResult<()>;

    /// Reads a row, or `None` if there is no such identifier.
    fn fetch(&self, record_type: &str, id: RecordId) -> StoreResult<Option<StoredRow>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn insert(&self, request: &SaveRequest) -> StoreResult<RecordId> {
        (**self).insert(request)
    }

    fn update(&self, request: &SaveRequest) -> StoreResult<()> {
        (**self).update(request)
    }

    fn fetch(&self, record_type: &str, id: RecordId) -> StoreResult<Option<StoredRow>> {
        (**self).fetch(record_type, id)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn insert(&self, request: &SaveRequest) -> StoreResult<RecordId> {
        (**self).insert(request)
    }

    fn update(&self, request: &SaveRequest) -> StoreResult<()> {
        (**self).update(request)
    }

    fn fetch(&self, record_type: &str, id: RecordId) -> StoreResult<Option<StoredRow>> {
        (**self).fetch(record_type, id)
    }
}
