//! Fixed-timestep game loop.
//!
//! The [`GameLoop`] owns the physics world, the entity registry, the loaded
//! levels, the session record, and the deferred timers. Nothing else holds
//! game state. Each [`tick`](GameLoop::tick):
//!
//! 1. Fires deferred transitions that came due.
//! 2. Steps physics with a [`CollisionReactor`] as the contact listener.
//! 3. Applies the recorded contact effects: coin marks and score, pig marks,
//!    spike death.
//! 4. Advances bird flight and idle timers.
//! 5. Removes marked pigs (awarding their points), then marked coins.
//! 6. Checks level completion.
//! 7. Checks the bird lifecycle: respawn or schedule game over.
//! 8. Advances the tick counter.
//!
//! Pigs destroyed during a tick are gone before step 6 looks for survivors.
//! Timers are counted in ticks, so a run is a pure function of its levels,
//! config, and pointer events.
//!
//! # Example
//!
//! ```
//! use slingshot_engine::prelude::*;
//!
//! let source = InMemoryLevelSource::new().with_level(
//!     "level1",
//!     serde_json::from_str(r#"{ "blocks": [ { "type": "pig", "x": 900, "y": 30 } ] }"#).unwrap(),
//! );
//! let levels = load_levels(&source, &["level1"]).unwrap();
//! let mut game = GameLoop::new(GameConfig::default(), levels).unwrap();
//!
//! // Drag left of the bird and release to fling it right.
//! game.pointer_down(Vec2::new(5.0, 10.0));
//! game.pointer_move(Vec2::new(3.0, 9.0));
//! game.pointer_up();
//!
//! game.run_ticks(30);
//! assert_eq!(game.session().projectiles_remaining, 29);
//! assert!(game.drain_events().iter().any(|e| matches!(e, GameEvent::BirdLaunched { .. })));
//! ```

use std::time::{Duration, Instant};

use slingshot_levels::document::Level;
use tracing::{debug, info, trace};

use crate::bird::{self, BirdPhase};
use crate::collision::{CollisionReactor, ContactEffects};
use crate::config::GameConfig;
use crate::events::GameEvent;
use crate::input::PointerEvent;
use crate::physics::{PhysicsWorld, Vec2};
use crate::progression::{self, Advance, LevelPhase};
use crate::registry::EntityRegistry;
use crate::session::Session;
use crate::snapshot::FrameSnapshot;
use crate::timers::{seconds_to_ticks, DeferredTimers, TimerKind};
use crate::EngineError;

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing and event counts for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time of the physics step.
    pub physics_time: Duration,
    /// Wall-clock time of the whole tick.
    pub total_time: Duration,
    /// Begin-contact callbacks delivered during the step.
    pub begin_contacts: usize,
    /// Post-solve callbacks delivered during the step.
    pub post_solves: usize,
    /// Deferred transitions fired at the start of the tick.
    pub timers_fired: usize,
}

// ---------------------------------------------------------------------------
// GameLoop
// ---------------------------------------------------------------------------

/// The single owner of all game state.
pub struct GameLoop {
    config: GameConfig,
    world: PhysicsWorld,
    registry: EntityRegistry,
    levels: Vec<Level>,
    session: Session,
    timers: DeferredTimers,
    events: Vec<GameEvent>,
    tick_counter: u64,
    last_diagnostics: TickDiagnostics,
}

impl GameLoop {
    /// Validate `config`, build the world, and initialize level 0.
    ///
    /// Fails with [`EngineError::NoLevels`] when `levels` is empty: there is
    /// nothing to play.
    pub fn new(config: GameConfig, levels: Vec<Level>) -> Result<Self, EngineError> {
        config.validate()?;
        if levels.is_empty() {
            return Err(EngineError::NoLevels);
        }

        let mut world = PhysicsWorld::new(config.physics.gravity);
        let registry = EntityRegistry::new(&mut world, &config);
        let session = Session::for_level(0, 0, config.rules.projectiles_per_level);

        let mut game = Self {
            config,
            world,
            registry,
            levels,
            session,
            timers: DeferredTimers::new(),
            events: Vec::new(),
            tick_counter: 0,
            last_diagnostics: TickDiagnostics::default(),
        };
        game.init_level(0, 0);
        Ok(game)
    }

    // -- level control --------------------------------------------------------

    /// Reinitialize the level at `index`, keeping the current score.
    pub fn load_level(&mut self, index: usize) -> Result<(), EngineError> {
        if index >= self.levels.len() {
            return Err(EngineError::LevelIndexOutOfRange {
                index,
                count: self.levels.len(),
            });
        }
        self.init_level(index, self.session.score);
        Ok(())
    }

    /// Reinitialize the level with identifier `id`, keeping the current score.
    ///
    /// An unknown identifier leaves the game untouched.
    pub fn select_level(&mut self, id: &str) -> Result<(), EngineError> {
        let index = self
            .levels
            .iter()
            .position(|l| l.id() == id)
            .ok_or_else(|| EngineError::UnknownLevel { id: id.to_owned() })?;
        self.load_level(index)
    }

    /// Tear down the world (ground excepted) and build level `index` from
    /// scratch with a fresh projectile budget and bird.
    fn init_level(&mut self, index: usize, score: u64) {
        self.timers.clear();
        self.registry.clear_world_except_ground(&mut self.world);

        let level = &self.levels[index];
        let converted = level.convert(self.config.physics.scale);
        self.registry
            .populate(&mut self.world, &converted, &self.config);

        let session = Session::for_level(index, score, self.config.rules.projectiles_per_level);
        self.session = bird::respawn(&mut self.world, session, &self.config);

        info!(
            level_index = index,
            level_id = level.id(),
            pigs = converted.pigs.len(),
            score,
            "level started"
        );
        self.events.push(GameEvent::LevelStarted {
            level_index: index,
            level_id: level.id().to_owned(),
        });
    }

    // -- stepping -------------------------------------------------------------

    /// Execute a single tick.
    pub fn tick(&mut self) {
        let tick_start = Instant::now();
        let now = self.tick_counter;

        // Phase 1: deferred transitions.
        let fired = self.timers.take_due(now);
        let timers_fired = fired.len();
        for kind in fired {
            if self.fire(kind) {
                // The level was rebuilt; anything else due belonged to the
                // superseded level.
                break;
            }
        }

        // Phase 2: physics. The reactor only records.
        let rules = &self.config.rules;
        let mut reactor = CollisionReactor::new(
            self.session.bird,
            self.session.launched,
            rules.pig_destroy_impulse,
            rules.impulse_policy,
        );
        let physics = &self.config.physics;
        let physics_start = Instant::now();
        let report = self.world.step(
            physics.fixed_dt,
            physics.velocity_iterations,
            physics.position_iterations,
            &mut reactor,
        );
        let physics_time = physics_start.elapsed();

        // Phase 3: contact effects.
        self.apply_effects(reactor.into_effects(), now);

        // Phase 4: bird timers.
        self.session = bird::update_timers(
            &self.world,
            self.session,
            self.config.physics.fixed_dt,
            &self.config.bird,
        );

        // Phase 5: cleanup, pigs before coins.
        self.cleanup();

        // Phase 6: level completion.
        self.check_level_complete(now);

        // Phase 7: bird lifecycle.
        self.check_bird(now);

        self.tick_counter += 1;
        self.last_diagnostics = TickDiagnostics {
            physics_time,
            total_time: tick_start.elapsed(),
            begin_contacts: report.begin_contacts,
            post_solves: report.post_solves,
            timers_fired,
        };
    }

    /// Run `count` ticks in sequence.
    pub fn run_ticks(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Run a deferred transition. Returns `true` if it rebuilt the level.
    fn fire(&mut self, kind: TimerKind) -> bool {
        debug!(?kind, tick = self.tick_counter, "timer fired");
        match kind {
            TimerKind::Respawn => {
                if self.session.bird.is_some() {
                    return false;
                }
                if self.session.has_projectiles() {
                    self.respawn_bird();
                } else if !self.session.level_complete {
                    self.schedule(TimerKind::GameOver, self.config.rules.game_over_delay);
                }
                false
            }
            TimerKind::LevelComplete => {
                let from = self.session.level_index;
                match progression::next_level(from, self.levels.len()) {
                    Advance::Next(to) => {
                        info!(from, to, score = self.session.score, "advancing to next level");
                        self.events.push(GameEvent::LevelAdvanced { from, to });
                        self.init_level(to, self.session.score);
                    }
                    Advance::Won => {
                        let final_score = self.session.score;
                        info!(final_score, "final level complete, game won");
                        self.events.push(GameEvent::GameWon { final_score });
                        self.init_level(0, 0);
                    }
                }
                true
            }
            TimerKind::GameOver => {
                if self.session.level_complete {
                    debug!("game over skipped, level already complete");
                    return false;
                }
                let level_index = self.session.level_index;
                info!(level_index, score = self.session.score, "game over, restarting level");
                self.events.push(GameEvent::GameOver { level_index });
                self.init_level(level_index, self.session.score);
                true
            }
        }
    }

    fn apply_effects(&mut self, effects: ContactEffects, now: u64) {
        if effects.is_empty() {
            return;
        }

        for coin in effects.collected_coins {
            if self.registry.mark_coin(coin) {
                let points = self.config.rules.coin_points;
                self.session = self.session.award(points);
                debug!(points, score = self.session.score, "coin collected");
                self.events.push(GameEvent::CoinCollected {
                    points,
                    score: self.session.score,
                });
            }
        }

        for pig in effects.destroyed_pigs {
            if self.registry.mark_pig(pig) {
                trace!(?pig, "pig marked for destruction");
            }
        }

        if effects.bird_spiked && self.session.launched {
            self.session = bird::kill_by_spike(&mut self.world, self.session);
            let projectiles_remaining = self.session.projectiles_remaining;
            info!(projectiles_remaining, "bird killed by spike");
            self.events.push(GameEvent::BirdKilledBySpike {
                projectiles_remaining,
            });
            let delay =
                seconds_to_ticks(self.config.rules.respawn_delay, self.config.physics.fixed_dt);
            self.timers.schedule(TimerKind::Respawn, now, delay);
        }
    }

    fn cleanup(&mut self) {
        let pigs = self.registry.cleanup_pigs(&mut self.world);
        if pigs > 0 {
            let points = pigs as u64 * self.config.rules.pig_points;
            self.session = self.session.award(points);
            debug!(count = pigs, points, score = self.session.score, "pigs destroyed");
            self.events.push(GameEvent::PigDestroyed {
                count: pigs,
                points,
                score: self.session.score,
            });
        }

        let coins = self.registry.cleanup_coins(&mut self.world);
        if coins > 0 {
            trace!(count = coins, "coins removed");
        }
    }

    fn check_level_complete(&mut self, now: u64) {
        let delay = seconds_to_ticks(
            self.config.rules.level_complete_delay,
            self.config.physics.fixed_dt,
        );
        let (session, entered) = progression::check_complete(
            self.session,
            self.registry.pig_count(),
            &mut self.timers,
            now,
            delay,
        );
        self.session = session;
        if entered {
            info!(
                level_index = session.level_index,
                score = session.score,
                "level complete"
            );
            self.events.push(GameEvent::LevelComplete {
                level_index: session.level_index,
                score: session.score,
            });
        }
    }

    fn check_bird(&mut self, now: u64) {
        let Some(reason) = bird::exhaustion(&self.world, &self.session, &self.config.bird) else {
            return;
        };
        self.session = self.session.end_flight();
        debug!(?reason, tick = now, "bird flight over");
        self.events.push(GameEvent::BirdExhausted { reason });

        if self.session.has_projectiles() {
            self.respawn_bird();
        } else if !self.session.level_complete {
            self.schedule(TimerKind::GameOver, self.config.rules.game_over_delay);
        }
    }

    fn respawn_bird(&mut self) {
        self.session = bird::respawn(&mut self.world, self.session, &self.config);
        let projectiles_remaining = self.session.projectiles_remaining;
        debug!(projectiles_remaining, "bird respawned");
        self.events.push(GameEvent::BirdRespawned {
            projectiles_remaining,
        });
    }

    fn schedule(&mut self, kind: TimerKind, delay_seconds: f64) {
        let delay = seconds_to_ticks(delay_seconds, self.config.physics.fixed_dt);
        if self.timers.schedule(kind, self.tick_counter, delay) {
            debug!(?kind, delay_ticks = delay, "timer scheduled");
        }
    }

    // -- pointer input --------------------------------------------------------

    /// Pointer pressed at a world position.
    pub fn pointer_down(&mut self, point: Vec2) {
        self.session = bird::pointer_down(&self.world, self.session, point, &self.config.bird);
        trace!(x = point.x, y = point.y, aiming = self.session.aiming, "pointer down");
    }

    /// Pointer moved to a world position.
    pub fn pointer_move(&mut self, point: Vec2) {
        self.session = bird::pointer_move(&self.world, self.session, point);
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        let (session, impulse) = bird::pointer_up(&mut self.world, self.session, &self.config.bird);
        self.session = session;
        if let Some(impulse) = impulse {
            let projectiles_remaining = session.projectiles_remaining;
            info!(
                impulse_x = impulse.x,
                impulse_y = impulse.y,
                projectiles_remaining,
                "bird launched"
            );
            self.events.push(GameEvent::BirdLaunched {
                impulse_x: impulse.x,
                impulse_y: impulse.y,
                projectiles_remaining,
            });
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(Vec2::new(x, y)),
            PointerEvent::Move { x, y } => self.pointer_move(Vec2::new(x, y)),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    // -- output ---------------------------------------------------------------

    /// Render state for the current frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(&self.world, &self.registry, &self.session, self.tick_counter)
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // -- accessors ------------------------------------------------------------

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// The current simulation time in seconds.
    ///
    /// Computed as `tick_count * fixed_dt` to avoid floating-point drift from
    /// repeated addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.config.physics.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.physics.fixed_dt
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn bird_phase(&self) -> BirdPhase {
        bird::phase(&self.session)
    }

    pub fn level_phase(&self) -> LevelPhase {
        progression::phase(&self.session, &self.timers)
    }

    pub fn timers(&self) -> &DeferredTimers {
        &self.timers
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Read-only access to the physics world.
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Mutable access to the physics world.
    ///
    /// Use sparingly. Bodies created or destroyed here bypass the registry.
    /// Moving existing bodies is appropriate for tooling and testing.
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// Diagnostics from the last tick.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
