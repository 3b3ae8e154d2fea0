//! Record model and change tracking for dirtywatch.
//!
//! Defines the types a persistence collaborator and application code share:
//! - [`RecordSchema`] / [`FieldDescriptor`]: per-field configuration table
//!   (type, dirty-tracking participation, managed timestamps)
//! - [`Record`]: the dynamic record (identifier plus typed field values)
//! - [`Snapshot`] / [`SnapshotTracker`]: baseline capture and dirty-set computation
//! - [`TimestampPolicy`] / [`Clock`]: creation and update timestamp stamping
//! - [`Model`]: typed entities such as [`Tutorial`] backed by a record
//! - [`RecordHooks`]: optional validation and post-load callbacks
//!
//! Nothing here performs I/O. Storage is reached through
//! `dirtywatch-session`.

mod error;
mod hooks;
mod model;
mod record;
mod schema;
mod snapshot;
mod timestamps;
mod tracker;
mod tutorial;

pub use error::{ModelError, ModelResult};
pub use hooks::RecordHooks;
pub use model::Model;
pub use record::Record;
pub use schema::{FieldDescriptor, ManagedTimestamp, RecordSchema, Tracking};
pub use snapshot::Snapshot;
pub use timestamps::{Clock, ManualClock, SystemClock, TimestampPolicy};
pub use tracker::{DirtySet, SnapshotTracker};
pub use tutorial::Tutorial;
