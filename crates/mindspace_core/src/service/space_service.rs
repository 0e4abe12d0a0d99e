//! Space use-case service.
//!
//! # Responsibility
//! - Own the live graph and the snapshot repository behind one API.
//! - Re-persist the durable subset after every mutation that changed it.
//! - Run hydration before the graph is ever exposed to a caller.
//!
//! # Invariants
//! - A failed save keeps the in-memory mutation; the next durable mutation
//!   retries the save.
//! - Import failures leave the graph untouched.
//! - Selection and linking changes never trigger persistence.

use crate::hydrate::{self, HydrateError, SNAPSHOT_SCHEMA_VERSION};
use crate::model::graph::{Graph, NodeUpdate};
use crate::model::node::{NodeId, Point3, SpaceMode, Theme, ViewMode};
use crate::repo::snapshot_repo::{
    ExportDocument, SnapshotDocument, SnapshotRepoError, SnapshotRepository, STORAGE_KEY,
};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surfaced by service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// The underlying store rejected a read/write/delete.
    Snapshot(SnapshotRepoError),
    /// The durable subset could not be serialized.
    Serialize(serde_json::Error),
    /// A user-provided import document was rejected.
    Import(HydrateError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::Import(err) => write!(f, "import rejected: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Import(err) => Some(err),
        }
    }
}

impl From<SnapshotRepoError> for ServiceError {
    fn from(value: SnapshotRepoError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Use-case service owning one graph instance and its persistence.
///
/// There is no ambient global: callers construct the service with whatever
/// repository fits (on-disk store, in-memory store for tests) and pass it
/// by reference to the layers above.
pub struct SpaceService<R: SnapshotRepository> {
    graph: Graph,
    repo: R,
    /// Graph revision the stored snapshot reflects. `None` means dirty.
    saved_revision: Option<u64>,
}

impl<R: SnapshotRepository> SpaceService<R> {
    /// Loads and hydrates the persisted snapshot, then returns the ready
    /// service. Malformed or unreadable snapshots degrade to the first-run
    /// state; startup itself never fails.
    pub fn hydrate(repo: R) -> Self {
        let started_at = Instant::now();
        info!("event=hydrate_open module=service status=start");

        let loaded = match repo.get(STORAGE_KEY) {
            Ok(value) => value,
            Err(err) => {
                error!("event=snapshot_load module=service status=error error={err}");
                None
            }
        };
        let had_snapshot = loaded.is_some();
        let state = match loaded {
            Some(raw) => hydrate::hydrate_snapshot(&raw).unwrap_or_else(|err| {
                warn!("event=snapshot_load module=service status=malformed error={err}");
                hydrate::hydrate_empty()
            }),
            None => hydrate::hydrate_empty(),
        };

        let hydration_changed = !had_snapshot
            || state.seeded > 0
            || state.repaired > 0
            || state.migrated_from < SNAPSHOT_SCHEMA_VERSION;
        let graph = Graph::from_hydrated(
            state.nodes,
            state.mode,
            state.has_seen_tutorial,
            state.theme,
            state.view_mode,
        );

        let mut service = Self {
            graph,
            repo,
            saved_revision: None,
        };
        if !hydration_changed {
            service.saved_revision = Some(service.graph.revision());
        }
        // Persist whatever hydration rewrote. On failure the service still
        // starts; the next durable mutation retries.
        if let Err(err) = service.save_if_dirty() {
            error!("event=snapshot_save module=service status=error phase=hydrate error={err}");
        }

        info!(
            "event=hydrate_open module=service status=ok duration_ms={} nodes={}",
            started_at.elapsed().as_millis(),
            service.graph.node_count()
        );
        service
    }

    /// Read access to the live graph for the view layer.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    // ---- node mutations ---------------------------------------------------

    pub fn add_node(
        &mut self,
        title: Option<&str>,
        texture_ref: Option<&str>,
    ) -> ServiceResult<NodeId> {
        let id = self.graph.add_node(title, texture_ref);
        info!("event=node_add module=service status=ok node={id}");
        self.save_if_dirty()?;
        Ok(id)
    }

    pub fn remove_node(&mut self, id: NodeId) -> ServiceResult<bool> {
        let removed = self.graph.remove_node(id);
        if removed {
            info!("event=node_remove module=service status=ok node={id}");
        } else {
            debug!("event=node_remove module=service status=noop node={id}");
        }
        self.save_if_dirty()?;
        Ok(removed)
    }

    pub fn update_node_position(&mut self, id: NodeId, position: Point3) -> ServiceResult<bool> {
        let updated = self.graph.update_node_position(id, position);
        self.save_if_dirty()?;
        Ok(updated)
    }

    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> ServiceResult<bool> {
        let updated = self.graph.update_node(id, update);
        self.save_if_dirty()?;
        Ok(updated)
    }

    pub fn set_mode(&mut self, mode: SpaceMode) -> ServiceResult<()> {
        self.graph.set_mode(mode);
        info!("event=mode_set module=service status=ok mode={mode:?}");
        self.save_if_dirty()
    }

    // ---- selection and linking (session-transient) ------------------------

    pub fn set_active_node(&mut self, id: Option<NodeId>) {
        self.graph.set_active_node(id);
    }

    pub fn start_linking(&mut self, id: NodeId) {
        self.graph.start_linking(id);
    }

    pub fn complete_link(&mut self, target: NodeId) -> ServiceResult<bool> {
        let linked = self.graph.complete_link(target);
        if linked {
            info!("event=link_complete module=service status=ok node={target}");
        }
        self.save_if_dirty()?;
        Ok(linked)
    }

    pub fn cancel_linking(&mut self) {
        self.graph.cancel_linking();
    }

    pub fn remove_connection(&mut self, from: NodeId, to: NodeId) -> ServiceResult<bool> {
        let removed = self.graph.remove_connection(from, to);
        self.save_if_dirty()?;
        Ok(removed)
    }

    // ---- undo -------------------------------------------------------------

    pub fn undo(&mut self) -> ServiceResult<bool> {
        let applied = self.graph.undo();
        if applied {
            info!("event=undo module=service status=ok");
        }
        self.save_if_dirty()?;
        Ok(applied)
    }

    pub fn can_undo(&self) -> bool {
        self.graph.can_undo()
    }

    // ---- settings ---------------------------------------------------------

    pub fn set_theme(&mut self, theme: Theme) -> ServiceResult<()> {
        self.graph.set_theme(theme);
        self.save_if_dirty()
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) -> ServiceResult<()> {
        self.graph.set_view_mode(view_mode);
        self.save_if_dirty()
    }

    pub fn set_has_seen_tutorial(&mut self, seen: bool) -> ServiceResult<()> {
        self.graph.set_has_seen_tutorial(seen);
        self.save_if_dirty()
    }

    // ---- backup, restore, reset -------------------------------------------

    /// Produces the user-facing backup document as pretty-printed JSON.
    pub fn export_snapshot(&self) -> ServiceResult<Vec<u8>> {
        let document = ExportDocument {
            nodes: self.graph.nodes_by_id(),
            mode: self.graph.mode(),
            exported_at: Utc::now().to_rfc3339(),
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
        };
        let bytes = serde_json::to_vec_pretty(&document)?;
        info!(
            "event=snapshot_export module=service status=ok nodes={}",
            self.graph.node_count()
        );
        Ok(bytes)
    }

    /// Replaces nodes and mode from a backup document. Parse failures are
    /// explicit and leave the graph untouched.
    pub fn import_snapshot(&mut self, bytes: &[u8]) -> ServiceResult<usize> {
        let (nodes, mode) = hydrate::hydrate_import(bytes).map_err(|err| {
            warn!("event=snapshot_import module=service status=error error={err}");
            ServiceError::Import(err)
        })?;
        let count = nodes.len();
        self.graph.replace_nodes_and_mode(nodes, mode);
        info!("event=snapshot_import module=service status=ok nodes={count}");
        self.save_if_dirty()?;
        Ok(count)
    }

    /// Deletes the persisted snapshot and returns to the empty state.
    pub fn reset(&mut self) -> ServiceResult<()> {
        self.repo.delete(STORAGE_KEY)?;
        self.graph = Graph::new();
        self.saved_revision = Some(self.graph.revision());
        info!("event=reset module=service status=ok");
        Ok(())
    }

    // ---- internals --------------------------------------------------------

    fn save_if_dirty(&mut self) -> ServiceResult<()> {
        let revision = self.graph.revision();
        if self.saved_revision == Some(revision) {
            return Ok(());
        }

        let started_at = Instant::now();
        let document = SnapshotDocument {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            nodes: self.graph.nodes_by_id(),
            mode: self.graph.mode(),
            has_seen_tutorial: self.graph.has_seen_tutorial(),
            theme: self.graph.theme(),
            view_mode: self.graph.view_mode(),
        };
        let payload = serde_json::to_string(&document)?;

        match self.repo.put(STORAGE_KEY, &payload) {
            Ok(()) => {
                self.saved_revision = Some(revision);
                debug!(
                    "event=snapshot_save module=service status=ok duration_ms={} nodes={}",
                    started_at.elapsed().as_millis(),
                    self.graph.node_count()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_save module=service status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }
}
