//! Graph state machine: nodes, selection, linking, layout mode, undo.
//!
//! # Responsibility
//! - Own the node collection and every mutation path over it.
//! - Keep connections symmetric and free of self/dangling references.
//! - Record destructive edits in the bounded undo log.
//!
//! # Invariants
//! - Node ids are unique and never reused.
//! - If node A lists B as a connection, B lists A; no node lists itself.
//! - Deleting a node strips it from every other connection list in the same
//!   operation.
//! - Orbit radii are assigned monotonically in creation order: a new node
//!   always orbits strictly farther out than every node existing at its
//!   creation time.
//! - Every operation is synchronous and total; unknown ids are silent
//!   no-ops, never errors.

use crate::geometry;
use crate::model::node::{
    epoch_millis, random_palette_texture, Node, NodeId, Point3, SpaceMode, Theme, ViewMode,
    DEFAULT_NODE_TITLE,
};
use crate::undo::{UndoEntry, UndoLog};
use rand::Rng;
use std::collections::HashMap;
use std::f64::consts::TAU;

/// Radius of the sphere new galaxy-mode nodes spawn inside.
pub const GALAXY_SPAWN_RADIUS: f64 = 15.0;

/// Orbit radius given to the very first node of a collection.
pub const ORBIT_BASE_RADIUS: f64 = 15.0;

/// Gap between a new node's orbit and the farthest existing one.
pub const ORBIT_RADIUS_STEP: f64 = 20.0;

/// Ring radius used when switching into solar mode rearranges nodes around
/// the primary.
pub const SOLAR_RING_RADIUS: f64 = 10.0;

/// Default visual planet size for user-created nodes.
pub const DEFAULT_PLANET_SIZE: f64 = 2.0;

/// Derives a default orbital speed from the radius: farther planets revolve
/// slower, roughly inversely proportional to distance.
pub fn default_orbit_speed(radius: f64) -> f64 {
    (72.0 / radius).clamp(0.2, 6.0)
}

/// Partial update for a node's user text.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// The live idea graph. Created empty or rebuilt from a hydrated snapshot;
/// afterwards the single source of truth for all queries and mutations.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    active_node_id: Option<NodeId>,
    linking_from_id: Option<NodeId>,
    mode: SpaceMode,
    has_seen_tutorial: bool,
    theme: Theme,
    view_mode: ViewMode,
    undo_log: UndoLog,
    /// Bumped on every mutation of the durable subset. Selection and linking
    /// changes are session-transient and do not count.
    revision: u64,
}

impl Graph {
    /// Creates an empty graph in galaxy mode with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a graph from hydrated state. Selection, linking and undo
    /// history always start fresh; they are not part of the durable subset.
    pub fn from_hydrated(
        nodes: HashMap<NodeId, Node>,
        mode: SpaceMode,
        has_seen_tutorial: bool,
        theme: Theme,
        view_mode: ViewMode,
    ) -> Self {
        Self {
            nodes,
            mode,
            has_seen_tutorial,
            theme,
            view_mode,
            ..Self::default()
        }
    }

    // ---- read surface -----------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes sorted by creation time, id as tie-break. This is the stable
    /// order used for orbit assignment and the primary-node designation.
    pub fn nodes_in_creation_order(&self) -> Vec<&Node> {
        let mut ordered: Vec<&Node> = self.nodes.values().collect();
        ordered.sort_by_key(|node| (node.created_at, node.id));
        ordered
    }

    /// The designated primary: the earliest-created node, if any.
    pub fn primary_node(&self) -> Option<&Node> {
        self.nodes
            .values()
            .min_by_key(|node| (node.created_at, node.id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn mode(&self) -> SpaceMode {
        self.mode
    }

    pub fn active_node_id(&self) -> Option<NodeId> {
        self.active_node_id
    }

    pub fn linking_from_id(&self) -> Option<NodeId> {
        self.linking_from_id
    }

    pub fn has_seen_tutorial(&self) -> bool {
        self.has_seen_tutorial
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_log.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_log.len()
    }

    /// Durable-change counter. Callers compare across operations to decide
    /// whether the durable subset needs re-persisting.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ---- node mutations ---------------------------------------------------

    /// Creates a node at a random galaxy position and selects it.
    ///
    /// The orbit radius is strictly greater than every existing one, so the
    /// monotonic-orbit invariant holds by construction.
    pub fn add_node(&mut self, title: Option<&str>, texture_ref: Option<&str>) -> NodeId {
        // Strictly increasing creation stamps keep creation order well
        // defined even when several nodes land in the same millisecond.
        let newest = self.nodes.values().map(|node| node.created_at).max();
        let now = newest.map_or_else(epoch_millis, |t| epoch_millis().max(t + 1));
        let position = geometry::random_point_in_sphere(GALAXY_SPAWN_RADIUS);
        let texture = texture_ref
            .map(str::to_owned)
            .unwrap_or_else(|| random_palette_texture().to_owned());

        let mut node = Node::new(title.unwrap_or(DEFAULT_NODE_TITLE), position, texture, now);
        let radius = self.next_orbit_radius();
        node.orbit_radius = Some(radius);
        node.orbit_speed = Some(default_orbit_speed(radius));
        node.orbit_angle = Some(rand::thread_rng().gen::<f64>() * TAU);
        node.size = Some(DEFAULT_PLANET_SIZE);

        let id = node.id;
        self.nodes.insert(id, node);
        self.active_node_id = Some(id);
        self.mark_durable_change();
        id
    }

    /// Deletes a node, records a delete undo entry and strips the node from
    /// every remaining connection list. Unknown ids are a no-op.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(removed) = self.nodes.remove(&id) else {
            return false;
        };
        let now = epoch_millis();

        self.undo_log.push(UndoEntry::DeleteNode {
            node: Box::new(removed),
        });

        for node in self.nodes.values_mut() {
            if let Some(index) = node.connections.iter().position(|&other| other == id) {
                node.connections.swap_remove(index);
                node.touch(now);
            }
        }

        if self.active_node_id == Some(id) {
            self.active_node_id = None;
        }
        if self.linking_from_id == Some(id) {
            self.linking_from_id = None;
        }
        self.mark_durable_change();
        true
    }

    /// Moves a node. In galaxy-like modes the remembered galaxy position
    /// follows the drag; in solar mode it stays untouched so switching back
    /// restores the original scatter.
    pub fn update_node_position(&mut self, id: NodeId, position: Point3) -> bool {
        let galaxy_like = self.mode.behaves_as_galaxy();
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.position = position;
        if galaxy_like {
            node.galaxy_position = position;
        }
        node.touch(epoch_millis());
        self.mark_durable_change();
        true
    }

    /// Merges the provided text fields into a node. Unknown ids are a no-op.
    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if let Some(title) = update.title {
            node.title = title;
        }
        if let Some(body) = update.body {
            node.body = body;
        }
        node.touch(epoch_millis());
        self.mark_durable_change();
        true
    }

    /// Selection change. Selecting an unknown id selects nothing.
    pub fn set_active_node(&mut self, id: Option<NodeId>) {
        self.active_node_id = id.filter(|candidate| self.nodes.contains_key(candidate));
    }

    /// Switches the layout mode and performs the one-time rearrangement:
    /// into solar mode every node except the primary is placed on a ring
    /// around the primary's current position; back out, every node returns
    /// to its remembered galaxy position.
    pub fn set_mode(&mut self, mode: SpaceMode) {
        self.mode = mode;
        self.mark_durable_change();

        if self.nodes.is_empty() {
            return;
        }

        if mode == SpaceMode::Solar {
            let ordered: Vec<NodeId> = self
                .nodes_in_creation_order()
                .iter()
                .map(|node| node.id)
                .collect();
            let primary_id = ordered[0];
            let center = self.nodes[&primary_id].position;
            let others = &ordered[1..];

            for (index, id) in others.iter().enumerate() {
                let orbit = geometry::orbit_point(index, others.len(), center, SOLAR_RING_RADIUS);
                if let Some(node) = self.nodes.get_mut(id) {
                    node.position = orbit;
                }
            }
        } else {
            for node in self.nodes.values_mut() {
                node.position = node.galaxy_position;
            }
        }
    }

    // ---- linking state machine -------------------------------------------

    /// Begins a link gesture from `id`, silently discarding any prior
    /// in-progress source.
    pub fn start_linking(&mut self, id: NodeId) {
        self.linking_from_id = Some(id);
    }

    /// Completes the in-progress link onto `target`. Self-links, unknown
    /// endpoints and already-connected pairs add no edge; in every case the
    /// linking state is cleared. Returns whether an edge was added.
    pub fn complete_link(&mut self, target: NodeId) -> bool {
        let Some(source) = self.linking_from_id.take() else {
            return false;
        };
        if source == target
            || !self.nodes.contains_key(&source)
            || !self.nodes.contains_key(&target)
        {
            return false;
        }
        if self.nodes[&source].is_connected_to(target) {
            return false;
        }

        let now = epoch_millis();
        if let Some(node) = self.nodes.get_mut(&source) {
            node.connections.push(target);
            node.touch(now);
        }
        if let Some(node) = self.nodes.get_mut(&target) {
            node.connections.push(source);
            node.touch(now);
        }
        self.mark_durable_change();
        true
    }

    /// Abandons any in-progress link gesture.
    pub fn cancel_linking(&mut self) {
        self.linking_from_id = None;
    }

    /// Removes the connection between two nodes from both endpoints.
    /// A no-op if either node is missing or they are not connected.
    pub fn remove_connection(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return false;
        }
        let now = epoch_millis();
        let mut changed = false;
        for (owner, other) in [(from, to), (to, from)] {
            if let Some(node) = self.nodes.get_mut(&owner) {
                if let Some(index) = node.connections.iter().position(|&id| id == other) {
                    node.connections.swap_remove(index);
                    node.touch(now);
                    changed = true;
                }
            }
        }
        if changed {
            self.mark_durable_change();
        }
        changed
    }

    // ---- undo -------------------------------------------------------------

    /// Replays the most recent undo entry. A restored node comes back with
    /// its pre-deletion fields verbatim, including its former connection
    /// list; the severed reverse edges on other nodes are not re-added.
    /// Undoing never records a new entry.
    pub fn undo(&mut self) -> bool {
        match self.undo_log.pop() {
            Some(UndoEntry::DeleteNode { node }) => {
                self.nodes.insert(node.id, *node);
                self.mark_durable_change();
                true
            }
            Some(UndoEntry::MoveNode {
                node_id,
                previous_position,
            }) => {
                let galaxy_like = self.mode.behaves_as_galaxy();
                let Some(node) = self.nodes.get_mut(&node_id) else {
                    return false;
                };
                node.position = previous_position;
                if galaxy_like {
                    node.galaxy_position = previous_position;
                }
                self.mark_durable_change();
                true
            }
            None => false,
        }
    }

    // ---- settings ---------------------------------------------------------

    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.mark_durable_change();
        }
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        if self.view_mode != view_mode {
            self.view_mode = view_mode;
            self.mark_durable_change();
        }
    }

    pub fn set_has_seen_tutorial(&mut self, seen: bool) {
        if self.has_seen_tutorial != seen {
            self.has_seen_tutorial = seen;
            self.mark_durable_change();
        }
    }

    // ---- wholesale replacement (import) -----------------------------------

    /// Replaces the node collection and mode wholesale, clearing selection
    /// and any in-progress link. Settings are kept; only nodes and mode are
    /// taken from an imported document.
    pub fn replace_nodes_and_mode(&mut self, nodes: HashMap<NodeId, Node>, mode: SpaceMode) {
        self.nodes = nodes;
        self.mode = mode;
        self.active_node_id = None;
        self.linking_from_id = None;
        self.mark_durable_change();
    }

    /// Clones the node collection, keyed by id. Used by persistence and
    /// export, which serialize the map shape.
    pub fn nodes_by_id(&self) -> HashMap<NodeId, Node> {
        self.nodes.clone()
    }

    // ---- internals --------------------------------------------------------

    fn mark_durable_change(&mut self) {
        self.revision += 1;
    }

    /// Next orbit radius under the monotonic rule: strictly beyond the
    /// farthest existing orbit, or the baseline for the first node.
    fn next_orbit_radius(&self) -> f64 {
        self.nodes
            .values()
            .filter_map(|node| node.orbit_radius)
            .fold(None, |farthest: Option<f64>, radius| {
                Some(farthest.map_or(radius, |current| current.max(radius)))
            })
            .map_or(ORBIT_BASE_RADIUS, |farthest| farthest + ORBIT_RADIUS_STEP)
    }
}
