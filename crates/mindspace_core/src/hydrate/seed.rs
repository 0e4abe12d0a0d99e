//! First-run seeding of the starter planet catalog.
//!
//! # Responsibility
//! - Synthesize the fixed set of named starter nodes exactly once per
//!   snapshot lineage.
//! - Merge seeds with pre-existing user nodes without discarding anything.
//!
//! # Invariants
//! - Seeding is idempotent: any node carrying the seed marker suppresses it.
//! - Seed orbit radii are offset past the farthest existing orbit, so the
//!   monotonic-orbit invariant survives seeding into a non-empty graph.
//! - Galaxy placement of seeds is deterministic; no ambient randomness.

use crate::model::node::{epoch_millis, Node, NodeId, Point3};
use std::collections::HashMap;
use std::f64::consts::TAU;
use uuid::Uuid;

/// One entry of the starter catalog.
#[derive(Debug, Clone, Copy)]
pub struct SeedPlanet {
    pub title: &'static str,
    pub body: &'static str,
    pub color: &'static str,
    pub texture_ref: &'static str,
    pub orbit_radius: f64,
    pub orbit_speed: f64,
    pub size: f64,
}

/// The default starter collection, innermost orbit first.
pub const SEED_PLANETS: &[SeedPlanet] = &[
    SeedPlanet {
        title: "Quick Notes",
        body: "Inbox, fleeting thoughts, quick captures",
        color: "#8C7853",
        texture_ref: "/mercury.jpg",
        orbit_radius: 15.0,
        orbit_speed: 4.8,
        size: 1.2,
    },
    SeedPlanet {
        title: "Ideas",
        body: "Brainstorming, creative ideas, experiments",
        color: "#FFC649",
        texture_ref: "/venus.jpg",
        orbit_radius: 22.0,
        orbit_speed: 3.5,
        size: 2.0,
    },
    SeedPlanet {
        title: "Current Work",
        body: "Active projects, tasks in progress",
        color: "#4A90E2",
        texture_ref: "/earth-day.jpg",
        orbit_radius: 30.0,
        orbit_speed: 3.0,
        size: 2.0,
    },
    SeedPlanet {
        title: "Future Plans",
        body: "Upcoming projects, goals, aspirations",
        color: "#E27B58",
        texture_ref: "/mars.jpg",
        orbit_radius: 40.0,
        orbit_speed: 2.4,
        size: 1.5,
    },
    SeedPlanet {
        title: "Major Projects",
        body: "Large initiatives, complex work",
        color: "#C88B3A",
        texture_ref: "/jupiter.jpg",
        orbit_radius: 75.0,
        orbit_speed: 1.3,
        size: 4.0,
    },
    SeedPlanet {
        title: "Resources",
        body: "References, documentation, knowledge base",
        color: "#FAD5A5",
        texture_ref: "/moon.jpg",
        orbit_radius: 95.0,
        orbit_speed: 0.97,
        size: 3.5,
    },
    SeedPlanet {
        title: "Experiments",
        body: "Testing, prototypes, learning",
        color: "#4FD0E0",
        texture_ref: "/uranus.jpg",
        orbit_radius: 115.0,
        orbit_speed: 0.68,
        size: 2.8,
    },
    SeedPlanet {
        title: "Long-term Goals",
        body: "Vision, dreams, distant objectives",
        color: "#4B70DD",
        texture_ref: "/neptune.jpg",
        orbit_radius: 135.0,
        orbit_speed: 0.54,
        size: 2.6,
    },
];

/// Galaxy-scatter placement for seed planets: a flat deterministic spiral.
fn seed_galaxy_position(index: usize, total: usize) -> Point3 {
    let angle = index as f64 * TAU / total as f64;
    let radius = 4.0 + 1.5 * index as f64;
    Point3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

/// Synthesizes the starter catalog unless this lineage was already seeded.
/// Returns how many nodes were created.
pub fn seed_if_unseeded(nodes: &mut HashMap<NodeId, Node>) -> usize {
    if nodes.values().any(|node| node.is_seed_node) {
        return 0;
    }

    // Pre-existing user nodes keep their orbits; seeds start past them.
    let radius_offset = nodes
        .values()
        .filter_map(|node| node.orbit_radius)
        .fold(0.0f64, f64::max);

    let now = epoch_millis();
    let total = SEED_PLANETS.len();
    for (index, planet) in SEED_PLANETS.iter().enumerate() {
        // Staggered creation times keep creation order aligned with the
        // catalog's increasing radii.
        let created_at = now + index as i64;
        let position = seed_galaxy_position(index, total);

        let node = Node {
            id: Uuid::new_v4(),
            title: planet.title.to_string(),
            body: planet.body.to_string(),
            position,
            galaxy_position: position,
            connections: Vec::new(),
            color: planet.color.to_string(),
            texture_ref: planet.texture_ref.to_string(),
            created_at,
            updated_at: created_at,
            orbit_radius: Some(radius_offset + planet.orbit_radius),
            orbit_speed: Some(planet.orbit_speed),
            orbit_angle: Some(index as f64 * TAU / total as f64),
            size: Some(planet.size),
            is_seed_node: true,
        };
        nodes.insert(node.id, node);
    }
    total
}
