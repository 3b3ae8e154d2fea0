//! Library side of the `dirtywatch` binary.
//!
//! Kept separate from `main.rs` so the commands can be driven from tests.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dirtywatch_model::{DirtySet, ManualClock, Model, Record, RecordSchema, SnapshotTracker, Tutorial};
use dirtywatch_session::{MemoryStore, SaveOutcome, Session};
use dirtywatch_types::Timestamp;
use serde::Serialize;
use tracing::info;

/// One save performed by the demo.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DemoStep {
    pub label: String,
    pub outcome: SaveOutcome,
}

/// What `dirtywatch demo` prints.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub steps: Vec<DemoStep>,
    /// The reloaded tutorial after the last save.
    pub record: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<serde_json::Value>,
}

/// Reads a schema file, or returns the built-in Tutorial schema.
pub fn load_schema(path: Option<&Path>) -> Result<Arc<RecordSchema>> {
    let Some(path) = path else {
        return Ok(Tutorial::schema());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading schema {}", path.display()))?;
    let schema = RecordSchema::from_json(&json).with_context(|| format!("parsing schema {}", path.display()))?;
    Ok(Arc::new(schema))
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Fields that differ between two flat JSON documents of the same schema.
///
/// `before` plays the loaded baseline, `after` the mutated record. Ignored
/// and managed fields never appear.
pub fn diff_documents(
    schema: Arc<RecordSchema>,
    before: &serde_json::Value,
    after: &serde_json::Value,
) -> Result<DirtySet> {
    let before = Record::from_json(Arc::clone(&schema), before).context("invalid `before` document")?;
    let after = Record::from_json(schema, after).context("invalid `after` document")?;
    let tracker = SnapshotTracker::for_record(&before)?;
    Ok(tracker.dirty(&after)?)
}

/// `dirtywatch diff`: loads the schema and both documents from disk.
pub fn diff_files(schema: Option<&Path>, before: &Path, after: &Path) -> Result<DirtySet> {
    let schema = load_schema(schema)?;
    diff_documents(schema, &read_json(before)?, &read_json(after)?)
}

/// `dirtywatch demo`: walks a Tutorial through insert, update, an
/// ignored-field change and a reload against an in-memory store.
///
/// The clock starts at `start` (or now) and advances one second per save.
pub fn run_demo(start: Option<Timestamp>, dump: bool) -> Result<DemoReport> {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start.unwrap_or_else(Timestamp::now)));
    let session = Session::with_clock(Arc::clone(&store), Arc::clone(&clock));
    let mut steps = Vec::new();

    let mut tracked = session.create_model(&Tutorial::new(
        "Dirty checking",
        "Track which fields changed since load",
        false,
    ))?;
    let outcome = session.save(&mut tracked).context("inserting tutorial")?;
    info!("Inserted tutorial {} (dirty: {:?})", outcome.id, outcome.dirty);
    steps.push(DemoStep {
        label: "insert".into(),
        outcome,
    });

    clock.advance_millis(1_000)?;
    let mut tutorial: Tutorial = tracked.to_model()?;
    tutorial.set_title("Dirty checking in Rust");
    tracked.apply_model(&tutorial)?;
    let outcome = session.save(&mut tracked).context("updating title")?;
    info!("Updated tutorial {} (dirty: {:?})", outcome.id, outcome.dirty);
    steps.push(DemoStep {
        label: "update title".into(),
        outcome,
    });

    clock.advance_millis(1_000)?;
    tracked.set(Tutorial::PUBLISHED, true)?;
    let outcome = session.save(&mut tracked).context("publishing")?;
    info!("Published tutorial {} (dirty: {:?})", outcome.id, outcome.dirty);
    steps.push(DemoStep {
        label: "publish".into(),
        outcome,
    });

    session.reload(&mut tracked).context("reloading tutorial")?;

    let store = if dump {
        Some(serde_json::from_str(&store.dump()?)?)
    } else {
        None
    };
    Ok(DemoReport {
        steps,
        record: tracked.record().to_json(),
        store,
    })
}
