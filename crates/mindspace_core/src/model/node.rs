//! Node domain model.
//!
//! # Responsibility
//! - Define the planet/node record and its presentation defaults.
//! - Keep the fixed texture palette used for new and repaired nodes.
//!
//! # Invariants
//! - `id` is stable and never reused for another node.
//! - `updated_at` never decreases.
//! - Connection symmetry is enforced at the graph level, not here.

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one idea node.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NodeId = Uuid;

/// Fixed planet texture palette. Entries are opaque asset references from the
/// engine's point of view; the view layer resolves them.
pub const TEXTURE_PALETTE: &[&str] = &[
    "/earth-day.jpg",
    "/mars.jpg",
    "/moon.jpg",
    "/jupiter.jpg",
    "/mercury.jpg",
    "/venus.jpg",
    "/neptune.jpg",
    "/uranus.jpg",
];

/// Default node color applied at creation and by hydration repair.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Title used when a node is created without one.
pub const DEFAULT_NODE_TITLE: &str = "New Idea";

/// 3D coordinate in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Layout mode of the whole space.
///
/// `Path` is retained only so snapshots written by early builds still
/// deserialize; everywhere in the engine it behaves exactly like `Galaxy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpaceMode {
    #[default]
    Galaxy,
    Solar,
    Path,
}

impl SpaceMode {
    /// True for every mode that lays nodes out at their free-floating
    /// galaxy coordinates (`Galaxy` itself and the legacy `Path`).
    pub fn behaves_as_galaxy(self) -> bool {
        !matches!(self, Self::Solar)
    }
}

/// Visual theme. Opaque to the engine beyond persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    DeepSpace,
    Nebula,
    Ocean,
}

/// Presentation style of the active layout, persisted for the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Galaxy,
    SolarSystem,
}

/// One idea, rendered as a planet.
///
/// `position` is the coordinate the active layout uses; `galaxy_position`
/// remembers the free-floating placement so switching out of solar mode can
/// restore it. The orbital fields are meaningful only in solar mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub position: Point3,
    pub galaxy_position: Point3,
    #[serde(default)]
    pub connections: Vec<NodeId>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub texture_ref: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never decreases.
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// True for nodes synthesized by first-run seeding rather than the user.
    #[serde(default)]
    pub is_seed_node: bool,
}

impl Node {
    /// Creates a node with a generated stable ID and presentation defaults.
    ///
    /// Orbital attributes start unset; the graph assigns them so the
    /// monotonic orbit-radius rule has the whole collection in view.
    pub fn new(
        title: impl Into<String>,
        position: Point3,
        texture_ref: impl Into<String>,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            body: String::new(),
            position,
            galaxy_position: position,
            connections: Vec::new(),
            color: DEFAULT_COLOR.to_string(),
            texture_ref: texture_ref.into(),
            created_at: now,
            updated_at: now,
            orbit_radius: None,
            orbit_speed: None,
            orbit_angle: None,
            size: None,
            is_seed_node: false,
        }
    }

    /// Refreshes `updated_at`, keeping it monotonically non-decreasing.
    pub fn touch(&mut self, now: i64) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Returns whether this node lists `other` as a connection.
    pub fn is_connected_to(&self, other: NodeId) -> bool {
        self.connections.contains(&other)
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Picks a texture from the fixed palette using the ambient random source.
pub fn random_palette_texture() -> &'static str {
    TEXTURE_PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TEXTURE_PALETTE[0])
}

/// Returns whether `texture_ref` is one of the palette entries.
pub fn is_palette_texture(texture_ref: &str) -> bool {
    TEXTURE_PALETTE.contains(&texture_ref)
}
