//! Pointer input in world coordinates.

use serde::{Deserialize, Serialize};

use crate::physics::Vec2;

/// A pointer event, already converted to simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
}

impl PointerEvent {
    pub fn down(point: Vec2) -> Self {
        Self::Down {
            x: point.x,
            y: point.y,
        }
    }

    pub fn moved(point: Vec2) -> Self {
        Self::Move {
            x: point.x,
            y: point.y,
        }
    }

    /// The pointer position carried by the event, if any.
    pub fn point(&self) -> Option<Vec2> {
        match *self {
            Self::Down { x, y } | Self::Move { x, y } => Some(Vec2::new(x, y)),
            Self::Up => None,
        }
    }
}

/// Convert canvas pixels to world units.
pub fn canvas_to_world(px: f64, py: f64, scale: f64) -> Vec2 {
    Vec2::new(px / scale, py / scale)
}
