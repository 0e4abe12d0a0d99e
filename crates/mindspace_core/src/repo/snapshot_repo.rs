//! Snapshot repository: the durable key-value gateway.
//!
//! # Responsibility
//! - Store and retrieve the serialized snapshot document under the fixed
//!   storage key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - One storage key maps to at most one document.
//! - `get` returns raw text; interpreting (and tolerating malformed) content
//!   is the hydration layer's policy, not the repository's.

use crate::db::DbError;
use crate::model::node::{Node, NodeId, SpaceMode, Theme, ViewMode};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed storage key for the app's single durable snapshot.
pub const STORAGE_KEY: &str = "mindspace-storage";

pub type SnapshotRepoResult<T> = Result<T, SnapshotRepoError>;

/// Error for snapshot persistence operations.
#[derive(Debug)]
pub enum SnapshotRepoError {
    Db(DbError),
}

impl Display for SnapshotRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SnapshotRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// The persisted durable subset: nodes, layout mode and app settings.
///
/// Serialized as one JSON document. Field defaults keep older documents
/// readable after the migration chain has normalized their shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    #[serde(default = "initial_schema_version")]
    pub schema_version: u32,
    pub nodes: HashMap<NodeId, Node>,
    #[serde(default)]
    pub mode: SpaceMode,
    #[serde(default)]
    pub has_seen_tutorial: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub view_mode: ViewMode,
}

fn initial_schema_version() -> u32 {
    1
}

/// User-facing backup document written by export and read back by import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub nodes: HashMap<NodeId, Node>,
    #[serde(default)]
    pub mode: SpaceMode,
    /// ISO-8601 export timestamp.
    pub exported_at: String,
    pub schema_version: String,
}

/// Storage contract for the durable snapshot.
pub trait SnapshotRepository {
    /// Upserts `value` under `key`.
    fn put(&self, key: &str, value: &str) -> SnapshotRepoResult<()>;
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> SnapshotRepoResult<Option<String>>;
    /// Deletes the stored value. Deleting an absent key is a no-op.
    fn delete(&self, key: &str) -> SnapshotRepoResult<()>;
}

/// SQLite-backed snapshot repository over the `snapshots` table.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn put(&self, key: &str, value: &str) -> SnapshotRepoResult<()> {
        self.conn.execute(
            "INSERT INTO snapshots (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> SnapshotRepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM snapshots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn delete(&self, key: &str) -> SnapshotRepoResult<()> {
        self.conn
            .execute("DELETE FROM snapshots WHERE key = ?1;", [key])?;
        Ok(())
    }
}
