//! Read-only render snapshot with BLAKE3 hashing.
//!
//! [`FrameSnapshot`] is everything a renderer needs to draw one frame: the
//! ground line, each box and spike as a polygon, each pig and visible coin as
//! a circle, the bird (if any), the aim line while aiming, and the HUD
//! scalars. It is plain data. Holding one never borrows the game.
//!
//! # Usage
//!
//! ```
//! use slingshot_engine::prelude::*;
//!
//! let doc: LevelDocument = serde_json::from_str(
//!     r#"{ "blocks": [ { "type": "block", "x": 600, "y": 30, "width": 60, "height": 60 },
//!                      { "type": "pig", "x": 660, "y": 60 } ] }"#,
//! ).unwrap();
//! let mut game = GameLoop::new(GameConfig::default(), vec![Level::new("demo", doc)]).unwrap();
//! game.run_ticks(5);
//!
//! let frame = game.snapshot();
//! assert_eq!(frame.boxes.len(), 1);
//! assert_eq!(frame.boxes[0].polygon.len(), 4);
//! assert_eq!(frame.digest().len(), 64); // BLAKE3 hex digest
//! ```

use serde::Serialize;

use crate::physics::{BodyHandle, PhysicsWorld, ShapeParams, Vec2};
use crate::registry::EntityRegistry;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A line segment in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentView {
    pub a: Vec2,
    pub b: Vec2,
}

/// A circle in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleView {
    pub center: Vec2,
    pub radius: f64,
    pub rotation: f64,
}

/// A box with its transform and world-space corners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxView {
    pub center: Vec2,
    pub half_width: f64,
    pub half_height: f64,
    /// Radians, counter-clockwise.
    pub rotation: f64,
    /// Corners in counter-clockwise order.
    pub polygon: Vec<Vec2>,
}

/// A closed polygon in world units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonView {
    pub vertices: Vec<Vec2>,
}

/// The sling line from the bird to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AimLine {
    pub from: Vec2,
    pub to: Vec2,
}

/// HUD scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub level_index: usize,
    pub projectiles_remaining: u32,
    pub level_complete: bool,
}

// ---------------------------------------------------------------------------
// FrameSnapshot
// ---------------------------------------------------------------------------

/// One frame of render state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Ticks executed when the snapshot was taken.
    pub tick: u64,
    pub ground: Option<SegmentView>,
    pub boxes: Vec<BoxView>,
    pub spikes: Vec<PolygonView>,
    pub pigs: Vec<CircleView>,
    /// Coins not yet collected.
    pub coins: Vec<CircleView>,
    pub bird: Option<CircleView>,
    pub aim: Option<AimLine>,
    pub hud: Hud,
}

impl FrameSnapshot {
    /// Read the current frame out of the world.
    pub fn capture(
        world: &PhysicsWorld,
        registry: &EntityRegistry,
        session: &Session,
        tick: u64,
    ) -> Self {
        let ground = match world.shape(registry.ground()) {
            Some(ShapeParams::Segment { a, b }) => {
                let origin = world.position(registry.ground()).unwrap_or(Vec2::ZERO);
                Some(SegmentView {
                    a: a + origin,
                    b: b + origin,
                })
            }
            _ => None,
        };

        let boxes = registry
            .boxes()
            .iter()
            .filter_map(|&h| box_view(world, h))
            .collect();
        let spikes = registry
            .spikes()
            .iter()
            .filter_map(|&h| box_view(world, h))
            .map(|b| PolygonView {
                vertices: b.polygon,
            })
            .collect();
        let pigs = registry
            .pigs()
            .filter_map(|h| circle_view(world, h))
            .collect();
        let coins = registry
            .visible_coins()
            .filter_map(|h| circle_view(world, h))
            .collect();
        let bird = session.bird.and_then(|h| circle_view(world, h));

        let aim = match (session.aiming, bird) {
            (true, Some(b)) => Some(AimLine {
                from: b.center,
                to: session.pointer,
            }),
            _ => None,
        };

        Self {
            tick,
            ground,
            boxes,
            spikes,
            pigs,
            coins,
            bird,
            aim,
            hud: Hud {
                score: session.score,
                level_index: session.level_index,
                projectiles_remaining: session.projectiles_remaining,
                level_complete: session.level_complete,
            },
        }
    }

    /// BLAKE3 hex digest of the serialized snapshot.
    ///
    /// Two runs fed the same levels, config, and inputs produce the same
    /// digest at the same tick.
    pub fn digest(&self) -> String {
        let json_bytes =
            serde_json::to_vec(self).expect("FrameSnapshot should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

fn circle_view(world: &PhysicsWorld, handle: BodyHandle) -> Option<CircleView> {
    let ShapeParams::Circle { radius } = world.shape(handle)? else {
        return None;
    };
    Some(CircleView {
        center: world.position(handle)?,
        radius,
        rotation: world.rotation(handle)?,
    })
}

fn box_view(world: &PhysicsWorld, handle: BodyHandle) -> Option<BoxView> {
    let ShapeParams::Box {
        half_width,
        half_height,
    } = world.shape(handle)?
    else {
        return None;
    };
    let center = world.position(handle)?;
    let rotation = world.rotation(handle)?;
    let (sin, cos) = rotation.sin_cos();
    let polygon = [
        (-half_width, -half_height),
        (half_width, -half_height),
        (half_width, half_height),
        (-half_width, half_height),
    ]
    .iter()
    .map(|&(x, y)| center + Vec2::new(x * cos - y * sin, x * sin + y * cos))
    .collect();

    Some(BoxView {
        center,
        half_width,
        half_height,
        rotation,
        polygon,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use slingshot_levels::convert::{BoxPlacement, CoinPlacement, ConvertedLevel, SpikePlacement};

    fn setup() -> (PhysicsWorld, EntityRegistry, Session) {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(config.physics.gravity);
        let mut registry = EntityRegistry::new(&mut world, &config);
        registry.populate(
            &mut world,
            &ConvertedLevel {
                boxes: vec![BoxPlacement {
                    x: 10.0,
                    y: 1.0,
                    width: 2.0,
                    height: 1.0,
                }],
                coins: vec![CoinPlacement {
                    x: 8.0,
                    y: 4.0,
                    radius: 0.5,
                }],
                spikes: vec![SpikePlacement {
                    x: 12.0,
                    y: 0.25,
                    width: 1.0,
                    height: 0.5,
                }],
                ..ConvertedLevel::default()
            },
            &config,
        );
        let bird = crate::bird::spawn_bird(&mut world, &config);
        let session = Session::for_level(1, 250, 7).with_bird(bird);
        (world, registry, session)
    }

    #[test]
    fn capture_reads_every_entity() {
        let (world, registry, session) = setup();
        let frame = FrameSnapshot::capture(&world, &registry, &session, 42);

        assert_eq!(frame.tick, 42);
        assert_eq!(
            frame.ground,
            Some(SegmentView {
                a: Vec2::new(-100.0, 0.0),
                b: Vec2::new(100.0, 0.0)
            })
        );
        assert_eq!(frame.boxes.len(), 1);
        assert_eq!(frame.spikes.len(), 1);
        assert_eq!(frame.coins.len(), 1);
        assert!(frame.pigs.is_empty());
        assert_eq!(frame.bird.unwrap().radius, 0.5);
        assert!(frame.aim.is_none());
        assert_eq!(
            frame.hud,
            Hud {
                score: 250,
                level_index: 1,
                projectiles_remaining: 7,
                level_complete: false
            }
        );
    }

    #[test]
    fn box_polygon_matches_extents() {
        let (world, registry, session) = setup();
        let frame = FrameSnapshot::capture(&world, &registry, &session, 0);
        let b = &frame.boxes[0];
        assert_eq!(b.rotation, 0.0);
        let xs: Vec<f64> = b.polygon.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = b.polygon.iter().map(|p| p.y).collect();
        assert!((xs.iter().cloned().fold(f64::MIN, f64::max) - 11.0).abs() < 1e-6);
        assert!((xs.iter().cloned().fold(f64::MAX, f64::min) - 9.0).abs() < 1e-6);
        assert!((ys.iter().cloned().fold(f64::MIN, f64::max) - 1.5).abs() < 1e-6);
        assert!((ys.iter().cloned().fold(f64::MAX, f64::min) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn collected_coins_are_not_drawn() {
        let (world, mut registry, session) = setup();
        let coin = registry.visible_coins().next().unwrap();
        registry.mark_coin(coin);
        let frame = FrameSnapshot::capture(&world, &registry, &session, 0);
        assert!(frame.coins.is_empty());
    }

    #[test]
    fn aim_line_runs_from_bird_to_pointer() {
        let (world, registry, session) = setup();
        let aiming = session.begin_aim(Vec2::new(4.0, 9.0));
        let frame = FrameSnapshot::capture(&world, &registry, &aiming, 0);
        assert_eq!(
            frame.aim,
            Some(AimLine {
                from: Vec2::new(5.0, 10.0),
                to: Vec2::new(4.0, 9.0)
            })
        );
    }

    #[test]
    fn digest_tracks_content() {
        let (world, registry, session) = setup();
        let a = FrameSnapshot::capture(&world, &registry, &session, 0);
        let b = FrameSnapshot::capture(&world, &registry, &session, 0);
        let c = FrameSnapshot::capture(&world, &registry, &session.award(50), 0);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert!(a.digest().chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
