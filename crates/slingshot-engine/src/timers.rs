//! Deferred one-shot transitions.
//!
//! Respawn-after-death, level-complete, and game-over each happen some time
//! after their trigger. Each kind has at most one pending timer: scheduling a
//! kind that is already pending is refused, so a condition that stays true
//! across many ticks schedules exactly once. Timers are measured in ticks, so
//! they fire on the same tick on every run.

use serde::{Deserialize, Serialize};

/// The kinds of deferred transition. Declaration order breaks ties between
/// timers due on the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Replace a bird killed by a spike, or give up if none remain.
    Respawn,
    /// Advance to the next level (or win).
    LevelComplete,
    /// Restart the current level after running out of birds.
    GameOver,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [Self::Respawn, Self::LevelComplete, Self::GameOver];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Pending timers, one slot per [`TimerKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredTimers {
    /// Due tick per kind; `None` when idle.
    due: [Option<u64>; 3],
}

impl DeferredTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` during tick `now` to fire `delay_ticks` later.
    ///
    /// A delay of zero still fires no earlier than the next tick. Returns
    /// `false`, leaving the existing timer alone, if `kind` is already
    /// pending.
    pub fn schedule(&mut self, kind: TimerKind, now: u64, delay_ticks: u64) -> bool {
        let slot = &mut self.due[kind.slot()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(now + delay_ticks.max(1));
        true
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.due[kind.slot()].is_some()
    }

    /// Tick at which `kind` will fire, if pending.
    pub fn due_at(&self, kind: TimerKind) -> Option<u64> {
        self.due[kind.slot()]
    }

    /// Remove and return every timer due at or before tick `now`, in firing
    /// order. Clearing the slot is what re-arms the kind.
    pub fn take_due(&mut self, now: u64) -> Vec<TimerKind> {
        let mut fired: Vec<(u64, TimerKind)> = TimerKind::ALL
            .iter()
            .filter_map(|&kind| match self.due[kind.slot()] {
                Some(at) if at <= now => Some((at, kind)),
                _ => None,
            })
            .collect();
        fired.sort();
        for (_, kind) in &fired {
            self.due[kind.slot()] = None;
        }
        fired.into_iter().map(|(_, kind)| kind).collect()
    }

    /// Drop every pending timer. Called on level (re)initialization so no
    /// stale transition acts on a superseded level.
    pub fn clear(&mut self) {
        self.due = [None; 3];
    }

    pub fn pending_count(&self) -> usize {
        self.due.iter().filter(|d| d.is_some()).count()
    }
}

/// Convert a delay in seconds to whole ticks, rounding to the nearest tick.
pub fn seconds_to_ticks(seconds: f64, fixed_dt: f64) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds / fixed_dt).round() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
