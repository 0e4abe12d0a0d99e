//! Versioned snapshot migration chain.
//!
//! # Responsibility
//! - Detect the schema version a document was written with.
//! - Apply shape migrations in strictly increasing version order until the
//!   document matches the current schema.
//!
//! # Invariants
//! - Each step is a deterministic shape rewrite given the document and the
//!   hydration timestamp; steps never drop nodes.
//! - A document claiming a newer version than this build knows is rejected,
//!   never patched.

use crate::hydrate::{HydrateError, HydrateResult};
use serde_json::{json, Map, Value};

/// Current snapshot schema version written by this build.
///
/// - v1: legacy text fields (`content`/`description`), pre-orbital shape.
/// - v2: `title`/`body` naming, remembered galaxy positions, connections.
/// - v3: orbital attributes, seed markers, app settings.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 3;

struct SnapshotMigration {
    version: u32,
    apply: fn(&mut Map<String, Value>, i64),
}

const CHAIN: &[SnapshotMigration] = &[
    SnapshotMigration {
        version: 2,
        apply: migrate_legacy_text_and_positions,
    },
    SnapshotMigration {
        version: 3,
        apply: migrate_settings_defaults,
    },
];

/// Reads the version marker of a raw document. Documents without a usable
/// marker predate versioning and count as version 1. String markers keep
/// only their leading integer (`"1.2"` reads as 1).
pub fn detect_schema_version(doc: &Value) -> u32 {
    let marker = match doc.get("schemaVersion") {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => text
            .split('.')
            .next()
            .and_then(|major| major.parse::<u64>().ok()),
        _ => None,
    };
    marker
        .and_then(|version| u32::try_from(version).ok())
        .filter(|&version| version >= 1)
        .unwrap_or(1)
}

/// Applies every pending migration step and stamps the current version.
pub fn run_chain(doc: Value, now: i64) -> HydrateResult<Value> {
    let current = detect_schema_version(&doc);
    let Value::Object(mut map) = doc else {
        return Err(HydrateError::InvalidDocument(
            "snapshot root is not an object".to_string(),
        ));
    };

    if current > SNAPSHOT_SCHEMA_VERSION {
        return Err(HydrateError::NewerSchemaVersion {
            found: current,
            latest: SNAPSHOT_SCHEMA_VERSION,
        });
    }

    for migration in CHAIN {
        if migration.version <= current {
            continue;
        }
        (migration.apply)(&mut map, now);
    }
    map.insert(
        "schemaVersion".to_string(),
        Value::from(SNAPSHOT_SCHEMA_VERSION),
    );

    Ok(Value::Object(map))
}

/// v1 -> v2: modern text field naming plus the backfills every later layer
/// assumes: timestamps, remembered galaxy positions, connection lists.
fn migrate_legacy_text_and_positions(doc: &mut Map<String, Value>, now: i64) {
    if !doc.contains_key("mode") {
        doc.insert("mode".to_string(), json!("GALAXY"));
    }

    for_each_node(doc, |key, node| {
        if !node.contains_key("id") {
            node.insert("id".to_string(), json!(key));
        }

        rename_field(node, "textureUrl", "textureRef");
        rename_field(node, "planetSize", "size");
        rename_field(node, "isDefaultPlanet", "isSeedNode");

        // Oldest shape: `content` held the title and `description` the body.
        // The in-between shape already had `title` and used `content` as the
        // body text.
        if !node.contains_key("title") {
            if let Some(content) = node.remove("content") {
                node.insert("title".to_string(), content);
                let body = node.remove("description").unwrap_or_else(|| json!(""));
                node.insert("body".to_string(), body);
            }
        } else if let Some(content) = node.remove("content") {
            node.entry("body".to_string()).or_insert(content);
        }
        node.remove("description");

        if !node.contains_key("createdAt") {
            node.insert("createdAt".to_string(), json!(now));
        }
        if !node.contains_key("updatedAt") {
            let created = node.get("createdAt").cloned().unwrap_or(json!(now));
            node.insert("updatedAt".to_string(), created);
        }

        if !node.contains_key("position") {
            let fallback = node
                .get("galaxyPosition")
                .cloned()
                .unwrap_or_else(origin_point);
            node.insert("position".to_string(), fallback);
        }
        if !node.contains_key("galaxyPosition") {
            let position = node.get("position").cloned().unwrap_or_else(origin_point);
            node.insert("galaxyPosition".to_string(), position);
        }

        if !node.contains_key("connections") {
            node.insert("connections".to_string(), json!([]));
        }
    });
}

/// v2 -> v3: app settings with defaults. The orbital attributes themselves
/// are data-level and handled by the repair pass, which also covers v3
/// documents with individually missing orbits.
fn migrate_settings_defaults(doc: &mut Map<String, Value>, _now: i64) {
    if !doc.contains_key("hasSeenTutorial") {
        doc.insert("hasSeenTutorial".to_string(), json!(false));
    }
    if !doc.contains_key("theme") {
        doc.insert("theme".to_string(), json!("deep-space"));
    }
    if !doc.contains_key("viewMode") {
        doc.insert("viewMode".to_string(), json!("galaxy"));
    }
}

fn for_each_node(
    doc: &mut Map<String, Value>,
    mut patch: impl FnMut(&str, &mut Map<String, Value>),
) {
    let Some(Value::Object(nodes)) = doc.get_mut("nodes") else {
        return;
    };
    for (key, value) in nodes.iter_mut() {
        if let Value::Object(node) = value {
            patch(key, node);
        }
    }
}

fn rename_field(node: &mut Map<String, Value>, legacy: &str, current: &str) {
    if let Some(value) = node.remove(legacy) {
        node.entry(current.to_string()).or_insert(value);
    }
}

fn origin_point() -> Value {
    json!({ "x": 0.0, "y": 0.0, "z": 0.0 })
}
