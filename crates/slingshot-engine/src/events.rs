//! Gameplay events emitted by the game loop.
//!
//! The host drains these once per frame with
//! [`GameLoop::drain_events`](crate::tick::GameLoop::drain_events) to drive
//! banners, sounds, or logs. They are a record of what happened, never an
//! input: dropping them changes nothing in the simulation.

use serde::{Deserialize, Serialize};

use crate::bird::ExhaustReason;

/// Something notable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A level was (re)initialized.
    LevelStarted { level_index: usize, level_id: String },
    CoinCollected { points: u64, score: u64 },
    PigDestroyed { count: usize, points: u64, score: u64 },
    BirdLaunched { impulse_x: f64, impulse_y: f64, projectiles_remaining: u32 },
    /// A launched bird touched a spike.
    BirdKilledBySpike { projectiles_remaining: u32 },
    /// A flight ended by idling, timing out, or leaving the playfield.
    BirdExhausted { reason: ExhaustReason },
    BirdRespawned { projectiles_remaining: u32 },
    /// The last pig of the level was removed.
    LevelComplete { level_index: usize, score: u64 },
    /// The level-complete delay elapsed and the next level began.
    LevelAdvanced { from: usize, to: usize },
    /// The final level was completed; score and level index were reset.
    GameWon { final_score: u64 },
    /// The game-over delay elapsed and the current level restarted.
    GameOver { level_index: usize },
}
