//! Placement conversion from authoring pixels to simulation units.
//!
//! [`convert`] is a pure function: every coordinate and extent is divided by
//! the scale factor, and records are sorted into per-kind lists. Records whose
//! type the game does not know are dropped without error, since the editor
//! may emit decorative types. Records of a known type whose position is not
//! finite, or whose extents are missing or not positive, are skipped with a
//! warning: a body cannot be built from them.

use crate::document::PlacementRecord;

/// Authoring pixels per simulation unit.
pub const DEFAULT_SCALE: f64 = 30.0;

/// The placement types the game understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementKind {
    /// `block`: a static solid box.
    Block,
    /// `enemy` or `pig`: a destructible dynamic circle.
    Pig,
    /// `coin`: a collectible sensor circle.
    Coin,
    /// `spike`: a hazardous sensor box.
    Spike,
}

impl PlacementKind {
    /// Parse a record type. Returns `None` for types the game ignores.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "block" => Some(Self::Block),
            "enemy" | "pig" => Some(Self::Pig),
            "coin" => Some(Self::Coin),
            "spike" => Some(Self::Spike),
            _ => None,
        }
    }
}

/// Center and full extents of a static box, in simulation units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Spawn point of a pig. Pig size is fixed by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PigPlacement {
    pub x: f64,
    pub y: f64,
}

/// Center and radius of a coin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoinPlacement {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Center and full extents of a spike strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The result of [`convert`]: placements grouped by kind, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvertedLevel {
    pub pigs: Vec<PigPlacement>,
    pub boxes: Vec<BoxPlacement>,
    pub coins: Vec<CoinPlacement>,
    pub spikes: Vec<SpikePlacement>,
}

impl ConvertedLevel {
    /// Total number of placements across all kinds.
    pub fn len(&self) -> usize {
        self.pigs.len() + self.boxes.len() + self.coins.len() + self.spikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convert authoring records into simulation placements.
///
/// # Panics
///
/// Panics if `scale` is not positive and finite.
pub fn convert(records: &[PlacementRecord], scale: f64) -> ConvertedLevel {
    assert!(
        scale > 0.0 && scale.is_finite(),
        "scale must be positive and finite, got {scale}"
    );

    let mut out = ConvertedLevel::default();
    for record in records {
        let x = record.x / scale;
        let y = record.y / scale;

        let kind = PlacementKind::parse(&record.kind);
        if let Some(kind) = kind {
            if !has_usable_geometry(record, kind) {
                tracing::warn!(
                    kind = %record.kind,
                    id = record.id.as_deref().unwrap_or(""),
                    x = record.x,
                    y = record.y,
                    width = record.width,
                    height = record.height,
                    "skipping placement with unusable geometry"
                );
                continue;
            }
        }

        match kind {
            Some(PlacementKind::Pig) => out.pigs.push(PigPlacement { x, y }),
            Some(PlacementKind::Block) => out.boxes.push(BoxPlacement {
                x,
                y,
                width: record.width / scale,
                height: record.height / scale,
            }),
            Some(PlacementKind::Coin) => out.coins.push(CoinPlacement {
                x,
                y,
                radius: (record.width / 2.0) / scale,
            }),
            Some(PlacementKind::Spike) => out.spikes.push(SpikePlacement {
                x,
                y,
                width: record.width / scale,
                height: record.height / scale,
            }),
            None => {
                tracing::trace!(kind = %record.kind, "ignoring unsupported placement type");
            }
        }
    }
    out
}

/// Finite position, and positive finite extents for the kinds that use them.
/// Pigs take their size from the engine, coins only use the width.
fn has_usable_geometry(record: &PlacementRecord, kind: PlacementKind) -> bool {
    let extent = |v: f64| v > 0.0 && v.is_finite();
    let placed = record.x.is_finite() && record.y.is_finite();
    placed
        && match kind {
            PlacementKind::Pig => true,
            PlacementKind::Coin => extent(record.width),
            PlacementKind::Block | PlacementKind::Spike => {
                extent(record.width) && extent(record.height)
            }
        }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
