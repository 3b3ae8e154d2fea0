//! Persistence lifecycle for dirtywatch records.
//!
//! [`Session`] hydrates records from storage, saves them through a
//! [`RecordStore`] and reloads them. A save sends only the dirty fields of a
//! loaded record, applies managed timestamps, and refreshes the baseline
//! snapshot once storage has accepted the write.
//!
//! [`MemoryStore`] is an in-process store used by tests and the CLI.

mod error;
mod memory;
mod request;
mod session;
mod store;

pub use error::{SessionError, SessionResult, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use request::{ManagedStamp, ManagedTimestamps, SaveKind, SaveOutcome, SaveRequest, StoredRow};
pub use session::{Session, TrackedRecord};
pub use store::RecordStore;
