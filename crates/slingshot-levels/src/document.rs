//! Level document wire format.
//!
//! This is the shape the level storage API and the level editor exchange:
//!
//! ```json
//! { "blocks": [ { "type": "block", "x": 100, "y": 100, "width": 60, "height": 20 } ] }
//! ```
//!
//! Coordinates are authoring pixels. The editor also attaches an `id` to each
//! record; it is carried through untouched and ignored by the game.

use serde::{Deserialize, Serialize};

use crate::convert::{convert, ConvertedLevel};

/// One typed rectangle placed by the level author.
///
/// `kind` is kept as a free-form string so documents containing
/// editor-only types (e.g. `"catapult"`) still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Placement type: `block`, `enemy`/`pig`, `coin`, `spike`, or anything else.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Editor element id, if the editor emitted one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PlacementRecord {
    /// Build a record without an editor id.
    pub fn new(kind: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind: kind.to_owned(),
            x,
            y,
            width,
            height,
            id: None,
        }
    }
}

/// Body of `GET /levels/{id}` and of `POST`/`PUT` requests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelDocument {
    #[serde(default)]
    pub blocks: Vec<PlacementRecord>,
}

/// A loaded level: its identifier plus the ordered placement records.
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    id: String,
    blocks: Vec<PlacementRecord>,
}

impl Level {
    pub fn new(id: impl Into<String>, document: LevelDocument) -> Self {
        Self {
            id: id.into(),
            blocks: document.blocks,
        }
    }

    /// The identifier this level was loaded under.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn blocks(&self) -> &[PlacementRecord] {
        &self.blocks
    }

    /// Rebuild the wire document (used when writing the level back out).
    pub fn to_document(&self) -> LevelDocument {
        LevelDocument {
            blocks: self.blocks.clone(),
        }
    }

    /// Convert this level's records into simulation-unit placements.
    pub fn convert(&self, scale: f64) -> ConvertedLevel {
        convert(&self.blocks, scale)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_editor_output_with_ids() {
        let doc: LevelDocument = serde_json::from_value(serde_json::json!({
            "blocks": [
                { "id": "block-0", "type": "block", "x": 120, "y": 340.5, "width": 60, "height": 20 },
                { "id": "enemy-1", "type": "enemy", "x": 400, "y": 300, "width": 40, "height": 40 }
            ]
        }))
        .unwrap();

        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].kind, "block");
        assert_eq!(doc.blocks[0].id.as_deref(), Some("block-0"));
        assert!((doc.blocks[0].y - 340.5).abs() < f64::EPSILON);
        assert_eq!(doc.blocks[1].kind, "enemy");
    }

    #[test]
    fn missing_blocks_means_empty_level() {
        let doc: LevelDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let doc: LevelDocument =
            serde_json::from_str(r#"{ "blocks": [ { "type": "pig" } ] }"#).unwrap();
        let rec = &doc.blocks[0];
        assert_eq!((rec.x, rec.y, rec.width, rec.height), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn serialization_omits_absent_id() {
        let doc = LevelDocument {
            blocks: vec![PlacementRecord::new("coin", 1.0, 2.0, 25.0, 25.0)],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["blocks"][0].get("id").is_none());
        assert_eq!(json["blocks"][0]["type"], "coin");
    }

    #[test]
    fn level_round_trips_through_document() {
        let doc = LevelDocument {
            blocks: vec![PlacementRecord::new("spike", 10.0, 20.0, 30.0, 30.0)],
        };
        let level = Level::new("spike1", doc.clone());
        assert_eq!(level.id(), "spike1");
        assert_eq!(level.to_document(), doc);
    }
}
