//! Headless playthrough -- loads levels, throws scripted birds, logs events.
//!
//! Run with:
//!   cargo run --example headless_playthrough -p slingshot-engine
//!   cargo run --example headless_playthrough -p slingshot-engine -- path/to/levels
//!   SLINGSHOT_API_BASE=http://localhost:3000/api/v1 \
//!     cargo run --example headless_playthrough -p slingshot-engine --features http
//!
//! With a directory argument, `<dir>/<id>.json` is loaded for every id of the
//! default playlist. Without one, two built-in levels are used.
//! `RUST_LOG=info` shows every gameplay transition.

use slingshot_engine::prelude::*;

/// Drag offsets (pointer minus bird) for each scripted throw. The canvas is
/// y-down, so a negative y offset flings the bird down and to the right.
const THROWS: [(f64, f64); 6] = [
    (-3.0, -1.0),
    (-3.5, -2.0),
    (-2.5, -0.5),
    (-4.0, -2.5),
    (-3.0, -3.0),
    (-2.0, -1.5),
];

/// Give up on a throw after this many ticks (20 s at 60 Hz).
const MAX_TICKS_PER_THROW: u64 = 1200;

// ---------------------------------------------------------------------------
// Level loading
// ---------------------------------------------------------------------------

fn builtin_levels() -> InMemoryLevelSource {
    let level = |blocks: serde_json::Value| -> LevelDocument {
        serde_json::from_value(serde_json::json!({ "blocks": blocks }))
            .expect("built-in level is valid")
    };
    InMemoryLevelSource::new()
        .with_level(
            "level1",
            level(serde_json::json!([
                { "type": "block", "x": 645, "y": 615, "width": 150, "height": 30 },
                { "type": "block", "x": 600, "y": 570, "width": 30, "height": 60 },
                { "type": "block", "x": 690, "y": 570, "width": 30, "height": 60 },
                { "type": "pig", "x": 645, "y": 591, "width": 40, "height": 40 },
                { "type": "coin", "x": 390, "y": 270, "width": 30, "height": 30 }
            ])),
        )
        .with_level(
            "spike1",
            level(serde_json::json!([
                { "type": "spike", "x": 480, "y": 615, "width": 90, "height": 30 },
                { "type": "block", "x": 720, "y": 630, "width": 90, "height": 30 },
                { "type": "pig", "x": 720, "y": 606, "width": 40, "height": 40 }
            ])),
        )
}

fn load(arg: Option<String>) -> Result<Vec<Level>, anyhow::Error> {
    #[cfg(feature = "http")]
    {
        if let Ok(base) = std::env::var("SLINGSHOT_API_BASE") {
            let source = HttpLevelSource::new(base);
            return Ok(load_levels(&source, &DEFAULT_PLAYLIST)?);
        }
    }

    match arg {
        Some(dir) => {
            let source = DirectoryLevelSource::new(dir);
            Ok(load_levels(&source, &DEFAULT_PLAYLIST)?)
        }
        None => Ok(load_levels(&builtin_levels(), &["level1", "spike1"])?),
    }
}

// ---------------------------------------------------------------------------
// Playthrough
// ---------------------------------------------------------------------------

fn throw(game: &mut GameLoop, offset: (f64, f64)) {
    let Some(at) = game.session().bird.and_then(|b| game.world().position(b)) else {
        return;
    };
    game.handle_pointer(PointerEvent::down(at));
    game.handle_pointer(PointerEvent::moved(at + Vec2::new(offset.0, offset.1)));
    game.handle_pointer(PointerEvent::Up);
}

/// Tick until the bird is ready for another throw or the level changes.
fn play_out(game: &mut GameLoop) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..MAX_TICKS_PER_THROW {
        game.tick();
        let fresh = game.drain_events();
        let level_changed = fresh.iter().any(|e| matches!(e, GameEvent::LevelStarted { .. }));
        events.extend(fresh);
        if level_changed || game.bird_phase() == BirdPhase::Unarmed {
            break;
        }
    }
    events
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let levels = load(std::env::args().nth(1))?;
    let mut game = GameLoop::new(GameConfig::default(), levels)?;
    game.drain_events();

    for (n, offset) in THROWS.iter().enumerate() {
        throw(&mut game, *offset);
        for event in play_out(&mut game) {
            tracing::info!(throw = n + 1, event = %serde_json::to_string(&event)?, "event");
        }
    }

    let frame = game.snapshot();
    println!(
        "ticks={} sim_time={:.2}s level={} score={} birds_left={} digest={}",
        game.tick_count(),
        game.sim_time(),
        frame.hud.level_index,
        frame.hud.score,
        frame.hud.projectiles_remaining,
        frame.digest()
    );
    Ok(())
}
