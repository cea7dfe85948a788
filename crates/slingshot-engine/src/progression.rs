//! Level progression: Playing, Complete, Advancing.
//!
//! Completion is derived from the registry every tick and is one-way per
//! level instance. Entering Complete schedules the level-complete timer once;
//! when it fires, [`next_level`] decides between the next index and a win.

use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::timers::{DeferredTimers, TimerKind};

/// Where the current level is in its progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Pigs remain.
    Playing,
    /// The last pig was removed; the advance timer has not been scheduled
    /// yet or was already consumed.
    Complete,
    /// The advance timer is pending.
    Advancing,
}

/// Outcome of finishing level `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Start the level at this index.
    Next(usize),
    /// `current` was the final level.
    Won,
}

/// Pick what follows level `current` in a list of `count` levels.
pub fn next_level(current: usize, count: usize) -> Advance {
    if current + 1 < count {
        Advance::Next(current + 1)
    } else {
        Advance::Won
    }
}

pub fn phase(session: &Session, timers: &DeferredTimers) -> LevelPhase {
    if !session.level_complete {
        LevelPhase::Playing
    } else if timers.is_pending(TimerKind::LevelComplete) {
        LevelPhase::Advancing
    } else {
        LevelPhase::Complete
    }
}

/// Enter Complete when no pigs remain, scheduling the advance timer.
///
/// Returns the next session and whether this call performed the transition.
/// Once complete, further calls change nothing.
pub fn check_complete(
    session: Session,
    pigs_remaining: usize,
    timers: &mut DeferredTimers,
    now: u64,
    delay_ticks: u64,
) -> (Session, bool) {
    if session.level_complete || pigs_remaining > 0 {
        return (session, false);
    }
    timers.schedule(TimerKind::LevelComplete, now, delay_ticks);
    (session.complete(), true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
