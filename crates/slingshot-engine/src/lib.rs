//! Slingshot Engine -- simulation and game-state core for a slingshot physics
//! puzzle game.
//!
//! A bird is launched by a drag gesture into a level of boxes, pigs, coins,
//! and spikes. The engine wraps a rapier2d world and turns its contact events
//! into gameplay consequences, then runs the bird and level state machines on
//! a fixed timestep.
//!
//! World coordinates share the level editor's axes: x grows to the right, y
//! grows down the canvas, and one unit is 30 authoring pixels. Gravity pulls
//! toward positive y.
//!
//! The [`GameLoop`](tick::GameLoop) is the single owner of all state. Each
//! tick runs, in order:
//!
//! 1. Deferred transitions that came due (respawn, level complete, game over).
//! 2. The physics step. Contact callbacks only record effects.
//! 3. Recorded effects: coin marks, pig marks, spike death.
//! 4. Bird flight and idle timers.
//! 5. Pig cleanup, then coin cleanup.
//! 6. Level completion check.
//! 7. Bird lifecycle check.
//!
//! # Quick Start
//!
//! ```
//! use slingshot_engine::prelude::*;
//!
//! let doc: LevelDocument = serde_json::from_value(serde_json::json!({
//!     "blocks": [ { "type": "pig", "x": 600, "y": 60, "width": 40, "height": 40 } ]
//! })).unwrap();
//! let levels = vec![Level::new("level1", doc)];
//!
//! let mut game = GameLoop::new(GameConfig::default(), levels).unwrap();
//! game.run_ticks(10);
//!
//! assert_eq!(game.tick_count(), 10);
//! assert_eq!(game.session().projectiles_remaining, 30);
//! assert!(game.snapshot().bird.is_some());
//! ```

#![deny(unsafe_code)]

pub mod bird;
pub mod collision;
pub mod config;
pub mod events;
pub mod input;
pub mod physics;
pub mod progression;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod tick;
pub mod timers;

/// Re-export the levels crate for convenience.
pub use slingshot_levels;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by engine setup and level selection.
///
/// Physics misuse (invalid shapes, non-finite timesteps) is not represented
/// here: it panics, because a half-built physics world cannot be resumed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine was started without any playable level.
    #[error("no playable levels were loaded")]
    NoLevels,

    /// A level index outside the loaded level list was requested.
    #[error("level index {index} out of range ({count} levels loaded)")]
    LevelIndexOutOfRange { index: usize, count: usize },

    /// A level identifier that is not in the loaded level list was requested.
    #[error("unknown level '{id}'")]
    UnknownLevel { id: String },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {details}")]
    InvalidConfig { details: String },

    /// Reading a configuration file failed.
    #[error("failed to read configuration '{path}': {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file was not valid JSON for [`GameConfig`](config::GameConfig).
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Loading levels from a level source failed entirely.
    #[error(transparent)]
    Level(#[from] slingshot_levels::LevelError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use slingshot_levels::prelude::*;

    pub use crate::bird::{BirdPhase, ExhaustReason};
    pub use crate::collision::{CollisionReactor, ContactEffects};
    pub use crate::config::{
        BirdConfig, GameConfig, GroundConfig, ImpulsePolicy, MaterialConfig, Materials,
        PhysicsConfig, RulesConfig,
    };
    pub use crate::events::GameEvent;
    pub use crate::input::{canvas_to_world, PointerEvent};
    pub use crate::physics::{
        BodyDesc, BodyHandle, BodyKind, BodyRef, BodyTag, ContactImpulse, ContactListener,
        PhysicsWorld, ShapeParams, StepReport, Vec2,
    };
    pub use crate::progression::{Advance, LevelPhase};
    pub use crate::registry::EntityRegistry;
    pub use crate::session::Session;
    pub use crate::snapshot::{
        AimLine, BoxView, CircleView, FrameSnapshot, Hud, PolygonView, SegmentView,
    };
    pub use crate::tick::{GameLoop, TickDiagnostics};
    pub use crate::timers::{DeferredTimers, TimerKind};
    pub use crate::EngineError;
}
