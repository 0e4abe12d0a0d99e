//! Per-node integrity repair.
//!
//! # Responsibility
//! - Restore node-level invariants the migration chain cannot see: palette
//!   membership, color well-formedness, connection symmetry, orbit radii.
//!
//! # Invariants
//! - Runs on every hydration, independent of schema version.
//! - Orbit backfill processes nodes in stable creation order, so assigned
//!   radii are strictly increasing and never collide with existing ones.
//! - Repair never changes `updated_at`; it restores invariants, it does not
//!   count as a user edit.

use crate::model::graph::{
    default_orbit_speed, DEFAULT_PLANET_SIZE, ORBIT_BASE_RADIUS, ORBIT_RADIUS_STEP,
};
use crate::model::node::{
    is_palette_texture, random_palette_texture, Node, NodeId, DEFAULT_COLOR,
};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{3}(?:[0-9a-fA-F]{3})?$").expect("valid color regex"));

/// Repairs every node in place. Returns how many nodes changed.
pub fn repair_nodes(nodes: &mut HashMap<NodeId, Node>) -> usize {
    let ordered_ids = creation_order(nodes);
    let known_ids: HashSet<NodeId> = nodes.keys().copied().collect();
    let mut changed: HashSet<NodeId> = HashSet::new();

    for id in &ordered_ids {
        let Some(node) = nodes.get_mut(id) else {
            continue;
        };

        if !is_palette_texture(&node.texture_ref) {
            node.texture_ref = random_palette_texture().to_string();
            node.color = DEFAULT_COLOR.to_string();
            changed.insert(*id);
        }
        if !HEX_COLOR_RE.is_match(&node.color) {
            node.color = DEFAULT_COLOR.to_string();
            changed.insert(*id);
        }

        if scrub_connections(node, &known_ids) {
            changed.insert(*id);
        }
    }

    for id in symmetrize(nodes, &ordered_ids) {
        changed.insert(id);
    }

    for id in backfill_orbits(nodes, &ordered_ids) {
        changed.insert(id);
    }

    changed.len()
}

/// Drops self-references, duplicates and ids that no longer exist.
fn scrub_connections(node: &mut Node, known_ids: &HashSet<NodeId>) -> bool {
    let own_id = node.id;
    let before = node.connections.len();
    let mut seen: HashSet<NodeId> = HashSet::new();
    node.connections
        .retain(|&other| other != own_id && known_ids.contains(&other) && seen.insert(other));
    node.connections.len() != before
}

/// Adds the missing reverse edge wherever one endpoint lists the other but
/// not vice versa, restoring connection symmetry in persisted data.
fn symmetrize(nodes: &mut HashMap<NodeId, Node>, ordered_ids: &[NodeId]) -> Vec<NodeId> {
    let mut missing: Vec<(NodeId, NodeId)> = Vec::new();
    for id in ordered_ids {
        let Some(node) = nodes.get(id) else {
            continue;
        };
        for &other in &node.connections {
            if let Some(peer) = nodes.get(&other) {
                if !peer.is_connected_to(*id) {
                    missing.push((other, *id));
                }
            }
        }
    }

    let mut repaired = Vec::new();
    for (owner, edge) in missing {
        if let Some(node) = nodes.get_mut(&owner) {
            node.connections.push(edge);
            repaired.push(owner);
        }
    }
    repaired
}

/// Assigns orbit attributes to nodes that predate orbital support, in
/// stable creation order so radii stay strictly increasing.
fn backfill_orbits(nodes: &mut HashMap<NodeId, Node>, ordered_ids: &[NodeId]) -> Vec<NodeId> {
    let mut farthest: Option<f64> = nodes
        .values()
        .filter_map(|node| node.orbit_radius)
        .fold(None, |acc: Option<f64>, radius| {
            Some(acc.map_or(radius, |current| current.max(radius)))
        });

    let mut repaired = Vec::new();
    for id in ordered_ids {
        let Some(node) = nodes.get_mut(id) else {
            continue;
        };
        let mut touched = false;

        if node.orbit_radius.is_none() {
            let radius = farthest.map_or(ORBIT_BASE_RADIUS, |max| max + ORBIT_RADIUS_STEP);
            node.orbit_radius = Some(radius);
            touched = true;
        }
        // The maximum can only grow here, whether the radius was assigned
        // just now or carried over.
        if let Some(radius) = node.orbit_radius {
            farthest = Some(farthest.map_or(radius, |max| max.max(radius)));
        }

        if node.orbit_speed.is_none() {
            if let Some(radius) = node.orbit_radius {
                node.orbit_speed = Some(default_orbit_speed(radius));
                touched = true;
            }
        }
        if node.orbit_angle.is_none() {
            node.orbit_angle = Some(rand::thread_rng().gen::<f64>() * TAU);
            touched = true;
        }
        if node.size.is_none() {
            node.size = Some(DEFAULT_PLANET_SIZE);
            touched = true;
        }

        if touched {
            repaired.push(*id);
        }
    }
    repaired
}

fn creation_order(nodes: &HashMap<NodeId, Node>) -> Vec<NodeId> {
    let mut ordered: Vec<(i64, NodeId)> = nodes
        .values()
        .map(|node| (node.created_at, node.id))
        .collect();
    ordered.sort();
    ordered.into_iter().map(|(_, id)| id).collect()
}
