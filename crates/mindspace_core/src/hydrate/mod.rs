//! Snapshot migration and hydration pipeline.
//!
//! # Responsibility
//! - Turn a raw persisted document into live graph state, whatever schema
//!   version wrote it.
//! - Repair per-node defects and seed the starter collection exactly once
//!   per snapshot lineage.
//!
//! # Invariants
//! - Hydration runs to completion before the graph is exposed to callers.
//! - The migration chain never drops user nodes; it only rewrites shape.
//! - Seeding is idempotent, keyed on the presence of any seed-marked node.

use crate::model::node::{epoch_millis, Node, NodeId, SpaceMode, Theme, ViewMode};
use crate::repo::snapshot_repo::SnapshotDocument;
use log::info;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod chain;
pub mod repair;
pub mod seed;

pub use chain::SNAPSHOT_SCHEMA_VERSION;

pub type HydrateResult<T> = Result<T, HydrateError>;

/// Error for snapshot parsing and migration.
#[derive(Debug)]
pub enum HydrateError {
    /// The document is not valid JSON or does not decode to the expected
    /// shape after migration.
    Parse(serde_json::Error),
    /// The document was written by a newer build than this one supports.
    NewerSchemaVersion { found: u32, latest: u32 },
    /// The document is structurally unusable (not an object, no nodes, ...).
    InvalidDocument(String),
}

impl Display for HydrateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::NewerSchemaVersion { found, latest } => write!(
                f,
                "snapshot schema version {found} is newer than supported {latest}"
            ),
            Self::InvalidDocument(message) => write!(f, "invalid snapshot document: {message}"),
        }
    }
}

impl Error for HydrateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::NewerSchemaVersion { .. } => None,
            Self::InvalidDocument(_) => None,
        }
    }
}

impl From<serde_json::Error> for HydrateError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Fully hydrated graph state, ready to become the live store.
#[derive(Debug)]
pub struct HydratedState {
    pub nodes: HashMap<NodeId, Node>,
    pub mode: SpaceMode,
    pub has_seen_tutorial: bool,
    pub theme: Theme,
    pub view_mode: ViewMode,
    /// Schema version the document carried before migration.
    pub migrated_from: u32,
    /// Nodes changed by the integrity repair pass.
    pub repaired: usize,
    /// Seed nodes synthesized during this hydration.
    pub seeded: usize,
}

/// Hydrates a persisted snapshot document.
///
/// Runs the versioned migration chain, decodes the normalized document,
/// repairs per-node defects and seeds the starter collection when the
/// lineage has never been seeded.
pub fn hydrate_snapshot(raw: &str) -> HydrateResult<HydratedState> {
    let value: Value = serde_json::from_str(raw)?;
    let migrated_from = chain::detect_schema_version(&value);
    let value = chain::run_chain(value, epoch_millis())?;
    let doc: SnapshotDocument = serde_json::from_value(value)?;

    let state = finish(
        doc.nodes,
        doc.mode,
        doc.has_seen_tutorial,
        doc.theme,
        doc.view_mode,
        migrated_from,
        true,
    );
    info!(
        "event=hydrate module=hydrate status=ok nodes={} migrated_from={} repaired={} seeded={}",
        state.nodes.len(),
        state.migrated_from,
        state.repaired,
        state.seeded
    );
    Ok(state)
}

/// Hydrates the first-run state: no stored document at all.
///
/// Still runs seeding, so a fresh lineage starts with the planet catalog.
pub fn hydrate_empty() -> HydratedState {
    let state = finish(
        HashMap::new(),
        SpaceMode::default(),
        false,
        Theme::default(),
        ViewMode::default(),
        SNAPSHOT_SCHEMA_VERSION,
        true,
    );
    info!(
        "event=hydrate module=hydrate status=ok nodes={} migrated_from=none seeded={}",
        state.nodes.len(),
        state.seeded
    );
    state
}

/// Parses a user-provided import document into nodes and mode.
///
/// Unlike [`hydrate_snapshot`], failures here are explicit: the caller
/// reports them and leaves the live graph untouched. Imported nodes go
/// through the same migration chain and repair pass, but never through
/// seeding; importing is a restore, not a new lineage.
pub fn hydrate_import(bytes: &[u8]) -> HydrateResult<(HashMap<NodeId, Node>, SpaceMode)> {
    let raw = std::str::from_utf8(bytes)
        .map_err(|_| HydrateError::InvalidDocument("not valid UTF-8".to_string()))?;
    let value: Value = serde_json::from_str(raw)?;
    if value.get("nodes").is_none() {
        return Err(HydrateError::InvalidDocument(
            "missing `nodes` field".to_string(),
        ));
    }
    let value = chain::run_chain(value, epoch_millis())?;
    let doc: SnapshotDocument = serde_json::from_value(value)?;

    let mut nodes = doc.nodes;
    repair::repair_nodes(&mut nodes);
    Ok((nodes, doc.mode))
}

fn finish(
    mut nodes: HashMap<NodeId, Node>,
    mode: SpaceMode,
    has_seen_tutorial: bool,
    theme: Theme,
    view_mode: ViewMode,
    migrated_from: u32,
    seed: bool,
) -> HydratedState {
    let repaired = repair::repair_nodes(&mut nodes);
    let seeded = if seed {
        seed::seed_if_unseeded(&mut nodes)
    } else {
        0
    };
    HydratedState {
        nodes,
        mode,
        has_seen_tutorial,
        theme,
        view_mode,
        migrated_from,
        repaired,
        seeded,
    }
}
