//! Bird lifecycle: aiming, launching, flight termination, and respawn.
//!
//! ```text
//!   Unarmed --down on bird--> Aiming --up--> Flying
//!      ^                                        |
//!      |            idle / timeout / out of bounds / spike
//!      |                                        v
//!      +---- respawn (birds left) ---- flight over ---- none left --> Gone
//! ```
//!
//! Every function takes the current [`Session`] by value and returns the
//! next one. Functions that touch the physics world take it explicitly.

use serde::{Deserialize, Serialize};

use crate::config::{BirdConfig, GameConfig};
use crate::physics::{BodyDesc, BodyHandle, BodyKind, BodyTag, PhysicsWorld, ShapeParams, Vec2};
use crate::session::Session;

/// Where the bird is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BirdPhase {
    /// On the sling, no drag in progress.
    Unarmed,
    /// A drag started on the bird and has not been released.
    Aiming,
    /// Launched and physics-driven.
    Flying,
    /// No bird body exists (awaiting respawn, or out of birds).
    Gone,
}

/// Why a flight ended without a spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustReason {
    /// Passed the right edge of the playfield.
    OutOfBoundsRight,
    /// Left the playfield past its low-y edge.
    OutOfBoundsLow,
    /// Rested for the idle period.
    Settled,
    /// Flew for the maximum flight time.
    TimedOut,
}

/// Phase derived from the session flags.
pub fn phase(session: &Session) -> BirdPhase {
    match session.bird {
        None => BirdPhase::Gone,
        Some(_) if session.launched => BirdPhase::Flying,
        Some(_) if session.aiming => BirdPhase::Aiming,
        Some(_) => BirdPhase::Unarmed,
    }
}

/// Create a bird body at the configured start position.
pub fn spawn_bird(world: &mut PhysicsWorld, config: &GameConfig) -> BodyHandle {
    let b = &config.bird;
    let m = &config.materials.bird;
    world.create_body(
        &BodyDesc::new(
            BodyTag::Bird,
            BodyKind::Dynamic,
            b.start,
            ShapeParams::Circle { radius: b.radius },
        )
        .material(m.density, m.friction, m.restitution, m.sensor)
        .damping(b.linear_damping, b.angular_damping),
    )
}

/// Destroy the current bird body, if any, and create a fresh one.
///
/// After this exactly one bird body exists.
pub fn respawn(world: &mut PhysicsWorld, session: Session, config: &GameConfig) -> Session {
    if let Some(old) = session.bird {
        world.destroy_body(old);
    }
    session.with_bird(spawn_bird(world, config))
}

// ---------------------------------------------------------------------------
// Pointer transitions
// ---------------------------------------------------------------------------

/// Pointer pressed at `point`. Starts aiming only on the bird, with birds
/// left and no flight in progress; otherwise the session is unchanged.
pub fn pointer_down(
    world: &PhysicsWorld,
    session: Session,
    point: Vec2,
    config: &BirdConfig,
) -> Session {
    if !session.has_projectiles() || session.launched {
        return session;
    }
    let Some(center) = session.bird.and_then(|b| world.position(b)) else {
        return session;
    };
    if center.distance(point) < config.radius {
        session.begin_aim(point)
    } else {
        session
    }
}

/// Pointer moved to `point`. Updates the aim while aiming.
pub fn pointer_move(world: &PhysicsWorld, session: Session, point: Vec2) -> Session {
    if !session.aiming {
        return session;
    }
    match session.bird.and_then(|b| world.position(b)) {
        Some(center) => session.aim_at(point, center),
        None => session,
    }
}

/// Pointer released. Slings the bird along the aim vector.
///
/// Returns the next session and the applied impulse (`None` if nothing was
/// launched).
pub fn pointer_up(
    world: &mut PhysicsWorld,
    session: Session,
    config: &BirdConfig,
) -> (Session, Option<Vec2>) {
    if !session.aiming {
        return (session, None);
    }
    let Some(bird) = session.bird.filter(|b| world.contains(*b)) else {
        return (session, None);
    };

    let impulse = session.launch_vector.scale(config.launch_multiplier);
    world.stop(bird);
    world.apply_impulse(bird, impulse);
    (session.launch(), Some(impulse))
}

// ---------------------------------------------------------------------------
// Flight
// ---------------------------------------------------------------------------

/// Advance flight and idle timers by `dt` while flying.
pub fn update_timers(
    world: &PhysicsWorld,
    session: Session,
    dt: f64,
    config: &BirdConfig,
) -> Session {
    if !session.launched {
        return session;
    }
    let Some(bird) = session.bird else {
        return session;
    };
    let speed = world.linear_velocity(bird).map_or(0.0, Vec2::length);
    let spin = world.angular_velocity(bird).map_or(0.0, f64::abs);
    let resting = speed < config.stop_speed && spin < config.stop_angular && !session.aiming;
    session.tick_flight(dt, resting)
}

/// Whether the current flight is over, and why.
pub fn exhaustion(
    world: &PhysicsWorld,
    session: &Session,
    config: &BirdConfig,
) -> Option<ExhaustReason> {
    if !session.launched {
        return None;
    }
    let position = world.position(session.bird?)?;

    if position.x > config.out_right_x {
        Some(ExhaustReason::OutOfBoundsRight)
    } else if position.y < config.out_low_y {
        Some(ExhaustReason::OutOfBoundsLow)
    } else if session.idle_time >= config.idle_seconds {
        Some(ExhaustReason::Settled)
    } else if session.flight_time >= config.max_flight_seconds {
        Some(ExhaustReason::TimedOut)
    } else {
        None
    }
}

/// A launched bird touched a spike: end the flight, spend a projectile, and
/// destroy the body.
pub fn kill_by_spike(world: &mut PhysicsWorld, session: Session) -> Session {
    if let Some(bird) = session.bird {
        world.destroy_body(bird);
    }
    session.end_flight().consume_projectile().without_bird()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
