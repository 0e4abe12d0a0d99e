//! Core engine for MindSpace: the idea-graph state machine, its undo log,
//! and the versioned persistence pipeline underneath the 3D views.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod geometry;
pub mod hydrate;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod undo;

pub use hydrate::{HydrateError, SNAPSHOT_SCHEMA_VERSION};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::graph::{Graph, NodeUpdate};
pub use model::node::{Node, NodeId, Point3, SpaceMode, Theme, ViewMode};
pub use repo::snapshot_repo::{
    SnapshotRepoError, SnapshotRepository, SqliteSnapshotRepository, STORAGE_KEY,
};
pub use service::space_service::{ServiceError, ServiceResult, SpaceService};
pub use undo::{UndoEntry, UndoLog, UNDO_CAPACITY};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
