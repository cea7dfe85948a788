//! Engine tuning: physics stepping, bird behavior, materials, and rules.
//!
//! Every value has a default matching the shipped game, so a config file only
//! needs the keys it overrides:
//!
//! ```
//! use slingshot_engine::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "rules": { "projectiles_per_level": 3 } }"#).unwrap();
//! assert_eq!(config.rules.projectiles_per_level, 3);
//! assert_eq!(config.physics.velocity_iterations, 8);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use slingshot_levels::convert::DEFAULT_SCALE;

use crate::physics::Vec2;
use crate::EngineError;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub bird: BirdConfig,
    pub rules: RulesConfig,
    pub materials: Materials,
    pub ground: GroundConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<(), EngineError> {
        let p = &self.physics;
        positive("physics.fixed_dt", p.fixed_dt)?;
        positive("physics.scale", p.scale)?;
        if p.velocity_iterations == 0 {
            return invalid("physics.velocity_iterations must be at least 1");
        }
        if !p.gravity.is_finite() {
            return invalid("physics.gravity must be finite");
        }

        let b = &self.bird;
        positive("bird.radius", b.radius)?;
        positive("bird.launch_multiplier", b.launch_multiplier)?;
        positive("bird.idle_seconds", b.idle_seconds)?;
        positive("bird.max_flight_seconds", b.max_flight_seconds)?;
        non_negative("bird.stop_speed", b.stop_speed)?;
        non_negative("bird.stop_angular", b.stop_angular)?;
        non_negative("bird.linear_damping", b.linear_damping)?;
        non_negative("bird.angular_damping", b.angular_damping)?;
        if !b.start.is_finite() {
            return invalid("bird.start must be finite");
        }

        let r = &self.rules;
        positive("rules.pig_radius", r.pig_radius)?;
        non_negative("rules.pig_destroy_impulse", r.pig_destroy_impulse)?;
        non_negative("rules.level_complete_delay", r.level_complete_delay)?;
        non_negative("rules.game_over_delay", r.game_over_delay)?;
        non_negative("rules.respawn_delay", r.respawn_delay)?;

        for (name, m) in [
            ("block", &self.materials.block),
            ("pig", &self.materials.pig),
            ("coin", &self.materials.coin),
            ("spike", &self.materials.spike),
            ("bird", &self.materials.bird),
        ] {
            if !(m.density >= 0.0 && m.friction >= 0.0 && m.restitution >= 0.0) {
                return invalid(&format!("materials.{name} must be non-negative"));
            }
        }

        if !(self.ground.from.is_finite() && self.ground.to.is_finite()) {
            return invalid("ground endpoints must be finite");
        }
        Ok(())
    }
}

fn invalid(details: &str) -> Result<(), EngineError> {
    Err(EngineError::InvalidConfig {
        details: details.to_owned(),
    })
}

fn positive(name: &str, value: f64) -> Result<(), EngineError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        invalid(&format!("{name} must be positive and finite, got {value}"))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), EngineError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        invalid(&format!("{name} must be non-negative and finite, got {value}"))
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Physics stepping parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Seconds per tick.
    pub fixed_dt: f64,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    /// World gravity in units/s^2. The world shares the editor's y-down
    /// axes, so positive y pulls toward the bottom of the canvas.
    pub gravity: Vec2,
    /// Authoring pixels per simulation unit.
    pub scale: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            velocity_iterations: 8,
            position_iterations: 3,
            gravity: Vec2::new(0.0, 1.0),
            scale: DEFAULT_SCALE,
        }
    }
}

/// Bird shape, launch, and flight-termination tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    pub radius: f64,
    /// Where every fresh bird is created.
    pub start: Vec2,
    /// Impulse per unit of drag distance.
    pub launch_multiplier: f64,
    /// Speed below which the bird counts as resting.
    pub stop_speed: f64,
    /// Angular speed below which the bird counts as resting.
    pub stop_angular: f64,
    /// Resting time that ends a flight.
    pub idle_seconds: f64,
    /// Flight time that ends a flight regardless of motion.
    pub max_flight_seconds: f64,
    /// A flight ends once the bird passes this x.
    pub out_right_x: f64,
    /// A flight ends once the bird's y is below this (above the top edge of
    /// the canvas).
    pub out_low_y: f64,
    pub linear_damping: f64,
    pub angular_damping: f64,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            start: Vec2::new(5.0, 10.0),
            launch_multiplier: 5.0,
            stop_speed: 0.15,
            stop_angular: 0.25,
            idle_seconds: 1.0,
            max_flight_seconds: 15.0,
            out_right_x: 50.0,
            out_low_y: -10.0,
            linear_damping: 0.35,
            angular_damping: 0.35,
        }
    }
}

/// How the impulses of a multi-point contact are reduced to one number
/// before comparing against the pig destruction threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpulsePolicy {
    /// Only the first contact point.
    FirstPoint,
    /// The strongest contact point.
    #[default]
    MaxPoint,
    /// All contact points added together.
    Sum,
}

impl ImpulsePolicy {
    /// Reduce per-point normal impulses. `None` when there are no points.
    pub fn reduce(self, impulses: &[f64]) -> Option<f64> {
        if impulses.is_empty() {
            return None;
        }
        Some(match self {
            Self::FirstPoint => impulses[0],
            Self::MaxPoint => impulses.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Sum => impulses.iter().sum(),
        })
    }
}

/// Scoring, projectile budget, pig toughness, and transition delays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Birds granted by every level (re)initialization.
    pub projectiles_per_level: u32,
    pub coin_points: u64,
    pub pig_points: u64,
    pub pig_radius: f64,
    /// A pig is destroyed by a contact whose impulse is strictly above this.
    pub pig_destroy_impulse: f64,
    pub impulse_policy: ImpulsePolicy,
    /// Seconds between the last pig dying and the next level starting.
    pub level_complete_delay: f64,
    /// Seconds between running out of birds and the level restarting.
    pub game_over_delay: f64,
    /// Seconds between a spike death and the replacement bird.
    pub respawn_delay: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            projectiles_per_level: 30,
            coin_points: 50,
            pig_points: 100,
            pig_radius: 0.3,
            pig_destroy_impulse: 2.0,
            impulse_policy: ImpulsePolicy::MaxPoint,
            level_complete_delay: 0.5,
            game_over_delay: 0.5,
            respawn_delay: 0.0,
        }
    }
}

/// Material of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    /// Sensors report overlap but exert no force.
    pub sensor: bool,
}

impl MaterialConfig {
    pub const fn solid(density: f64, friction: f64, restitution: f64) -> Self {
        Self {
            density,
            friction,
            restitution,
            sensor: false,
        }
    }

    pub const fn sensor(density: f64, friction: f64, restitution: f64) -> Self {
        Self {
            density,
            friction,
            restitution,
            sensor: true,
        }
    }
}

/// Per-kind material table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Materials {
    pub block: MaterialConfig,
    pub pig: MaterialConfig,
    pub coin: MaterialConfig,
    pub spike: MaterialConfig,
    pub bird: MaterialConfig,
}

impl Default for Materials {
    fn default() -> Self {
        Self {
            block: MaterialConfig::solid(1.0, 0.5, 0.1),
            pig: MaterialConfig::solid(0.5, 0.5, 0.1),
            coin: MaterialConfig::sensor(0.0, 0.0, 0.0),
            spike: MaterialConfig::sensor(0.1, 0.3, 0.5),
            bird: MaterialConfig::solid(1.5, 0.6, 0.4),
        }
    }
}

/// The permanent ground edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub from: Vec2,
    pub to: Vec2,
    pub friction: f64,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            from: Vec2::new(-100.0, 0.0),
            to: Vec2::new(100.0, 0.0),
            friction: 0.8,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
