//! The game session record.
//!
//! [`Session`] holds every scalar of game state: level index, score,
//! projectile budget, level-complete flag, and the bird's flags, aim, and
//! timers. It is `Copy` and is never mutated in place. Each transition
//! consumes a record and returns the next one, so the game loop swaps the
//! whole record per transition.

use crate::physics::{BodyHandle, Vec2};

/// One immutable snapshot of session state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub level_index: usize,
    pub score: u64,
    pub projectiles_remaining: u32,
    pub level_complete: bool,
    /// The single live bird, if any.
    pub bird: Option<BodyHandle>,
    /// The bird has been slung and is physics-driven.
    pub launched: bool,
    /// A drag gesture is in progress on the bird.
    pub aiming: bool,
    /// Last pointer position seen while aiming.
    pub pointer: Vec2,
    /// Bird position minus pointer position, updated while aiming.
    pub launch_vector: Vec2,
    /// Seconds the bird has been resting during the current flight.
    pub idle_time: f64,
    /// Seconds since the current launch.
    pub flight_time: f64,
}

impl Session {
    /// A fresh record for a newly (re)initialized level.
    pub fn for_level(level_index: usize, score: u64, projectiles: u32) -> Self {
        Self {
            level_index,
            score,
            projectiles_remaining: projectiles,
            level_complete: false,
            bird: None,
            launched: false,
            aiming: false,
            pointer: Vec2::ZERO,
            launch_vector: Vec2::ZERO,
            idle_time: 0.0,
            flight_time: 0.0,
        }
    }

    /// Install a freshly created bird, clearing flight state.
    #[must_use]
    pub fn with_bird(self, bird: BodyHandle) -> Self {
        Self {
            bird: Some(bird),
            launched: false,
            aiming: false,
            launch_vector: Vec2::ZERO,
            idle_time: 0.0,
            flight_time: 0.0,
            ..self
        }
    }

    /// The bird body is gone; no flight in progress.
    #[must_use]
    pub fn without_bird(self) -> Self {
        Self {
            bird: None,
            launched: false,
            aiming: false,
            ..self
        }
    }

    #[must_use]
    pub fn award(self, points: u64) -> Self {
        Self {
            score: self.score.saturating_add(points),
            ..self
        }
    }

    /// Spend one projectile. Never goes below zero.
    #[must_use]
    pub fn consume_projectile(self) -> Self {
        Self {
            projectiles_remaining: self.projectiles_remaining.saturating_sub(1),
            ..self
        }
    }

    #[must_use]
    pub fn begin_aim(self, pointer: Vec2) -> Self {
        Self {
            aiming: true,
            pointer,
            ..self
        }
    }

    #[must_use]
    pub fn aim_at(self, pointer: Vec2, bird_position: Vec2) -> Self {
        Self {
            pointer,
            launch_vector: bird_position - pointer,
            ..self
        }
    }

    /// The aim was released: the bird is flying and one projectile is spent.
    #[must_use]
    pub fn launch(self) -> Self {
        Self {
            aiming: false,
            launched: true,
            idle_time: 0.0,
            flight_time: 0.0,
            ..self
        }
        .consume_projectile()
    }

    /// Flight ended without removing the bird.
    #[must_use]
    pub fn end_flight(self) -> Self {
        Self {
            launched: false,
            ..self
        }
    }

    /// Advance flight timers by `dt`. Idle time accumulates only while
    /// `resting`, and resets otherwise.
    #[must_use]
    pub fn tick_flight(self, dt: f64, resting: bool) -> Self {
        Self {
            flight_time: self.flight_time + dt,
            idle_time: if resting { self.idle_time + dt } else { 0.0 },
            ..self
        }
    }

    /// Enter the one-way complete state.
    #[must_use]
    pub fn complete(self) -> Self {
        Self {
            level_complete: true,
            ..self
        }
    }

    pub fn has_projectiles(&self) -> bool {
        self.projectiles_remaining > 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
