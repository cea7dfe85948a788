//! Entity registry: the live level bodies and their lifecycle.
//!
//! The registry creates every level body with its kind's material, tracks
//! the live pigs, coins, boxes, and spikes, and tears them down in bulk.
//! The ground is created once with the registry and survives every
//! teardown.
//!
//! Pigs and coins carry a destruction mark. Marks are set between the
//! physics step and cleanup. Cleanup is the only place their bodies are
//! destroyed, and it runs outside the step.

use slingshot_levels::convert::{
    BoxPlacement, CoinPlacement, ConvertedLevel, PigPlacement, SpikePlacement,
};
use tracing::debug;

use crate::config::{GameConfig, MaterialConfig};
use crate::physics::{BodyDesc, BodyHandle, BodyKind, BodyTag, PhysicsWorld, ShapeParams, Vec2};

/// A destructible body plus its pending-destruction mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marked {
    handle: BodyHandle,
    destroyed: bool,
}

/// Owns the live level entity collections.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    ground: BodyHandle,
    boxes: Vec<BodyHandle>,
    spikes: Vec<BodyHandle>,
    pigs: Vec<Marked>,
    coins: Vec<Marked>,
}

fn with_material(desc: BodyDesc, m: &MaterialConfig) -> BodyDesc {
    desc.material(m.density, m.friction, m.restitution, m.sensor)
}

impl EntityRegistry {
    /// Create the permanent ground and an empty registry.
    pub fn new(world: &mut PhysicsWorld, config: &GameConfig) -> Self {
        let g = &config.ground;
        let ground = world.create_body(
            &BodyDesc::new(
                BodyTag::Ground,
                BodyKind::Static,
                Vec2::ZERO,
                ShapeParams::Segment { a: g.from, b: g.to },
            )
            .material(0.0, g.friction, 0.0, false),
        );
        Self {
            ground,
            boxes: Vec::new(),
            spikes: Vec::new(),
            pigs: Vec::new(),
            coins: Vec::new(),
        }
    }

    /// Create bodies for every placement of a converted level.
    pub fn populate(
        &mut self,
        world: &mut PhysicsWorld,
        level: &ConvertedLevel,
        config: &GameConfig,
    ) {
        self.boxes
            .extend(level.boxes.iter().map(|b| spawn_box(world, b, config)));
        self.pigs.extend(level.pigs.iter().map(|p| Marked {
            handle: spawn_pig(world, p, config),
            destroyed: false,
        }));
        self.coins.extend(level.coins.iter().map(|c| Marked {
            handle: spawn_coin(world, c, config),
            destroyed: false,
        }));
        self.spikes
            .extend(level.spikes.iter().map(|s| spawn_spike(world, s, config)));
        debug!(
            boxes = self.boxes.len(),
            pigs = self.pigs.len(),
            coins = self.coins.len(),
            spikes = self.spikes.len(),
            "level entities created"
        );
    }

    /// Destroy every body in the world except the ground, the bird included,
    /// and forget all tracked entities.
    pub fn clear_world_except_ground(&mut self, world: &mut PhysicsWorld) -> usize {
        let destroyed = world.destroy_all_except(self.ground);
        self.boxes.clear();
        self.spikes.clear();
        self.pigs.clear();
        self.coins.clear();
        debug!(destroyed, "world cleared except ground");
        destroyed
    }

    /// Mark a live pig for destruction. Returns `true` if the mark is new.
    pub fn mark_pig(&mut self, handle: BodyHandle) -> bool {
        mark(&mut self.pigs, handle)
    }

    /// Mark a live coin for destruction. Returns `true` if the mark is new.
    pub fn mark_coin(&mut self, handle: BodyHandle) -> bool {
        mark(&mut self.coins, handle)
    }

    /// Destroy marked pigs. Returns how many were removed.
    pub fn cleanup_pigs(&mut self, world: &mut PhysicsWorld) -> usize {
        sweep(&mut self.pigs, world)
    }

    /// Destroy marked coins. Returns how many were removed.
    pub fn cleanup_coins(&mut self, world: &mut PhysicsWorld) -> usize {
        sweep(&mut self.coins, world)
    }

    // -- accessors ----------------------------------------------------------

    pub fn ground(&self) -> BodyHandle {
        self.ground
    }

    pub fn boxes(&self) -> &[BodyHandle] {
        &self.boxes
    }

    pub fn spikes(&self) -> &[BodyHandle] {
        &self.spikes
    }

    /// Live pigs, marked ones included until the next cleanup.
    pub fn pigs(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.pigs.iter().map(|m| m.handle)
    }

    /// Coins not marked as collected.
    pub fn visible_coins(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.coins.iter().filter(|m| !m.destroyed).map(|m| m.handle)
    }

    pub fn pig_count(&self) -> usize {
        self.pigs.len()
    }

    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    pub fn is_pig_marked(&self, handle: BodyHandle) -> bool {
        self.pigs.iter().any(|m| m.handle == handle && m.destroyed)
    }

    pub fn is_coin_marked(&self, handle: BodyHandle) -> bool {
        self.coins.iter().any(|m| m.handle == handle && m.destroyed)
    }
}

fn mark(entries: &mut [Marked], handle: BodyHandle) -> bool {
    match entries.iter_mut().find(|m| m.handle == handle) {
        Some(m) if !m.destroyed => {
            m.destroyed = true;
            true
        }
        _ => false,
    }
}

fn sweep(entries: &mut Vec<Marked>, world: &mut PhysicsWorld) -> usize {
    let before = entries.len();
    entries.retain(|m| {
        if !m.destroyed {
            return true;
        }
        world.destroy_body(m.handle);
        false
    });
    before - entries.len()
}

// ---------------------------------------------------------------------------
// Entity constructors
// ---------------------------------------------------------------------------

/// A static solid box.
pub fn spawn_box(world: &mut PhysicsWorld, b: &BoxPlacement, config: &GameConfig) -> BodyHandle {
    let desc = BodyDesc::new(
        BodyTag::Box,
        BodyKind::Static,
        Vec2::new(b.x, b.y),
        ShapeParams::Box {
            half_width: b.width / 2.0,
            half_height: b.height / 2.0,
        },
    );
    world.create_body(&with_material(desc, &config.materials.block))
}

/// A dynamic destructible circle.
pub fn spawn_pig(world: &mut PhysicsWorld, p: &PigPlacement, config: &GameConfig) -> BodyHandle {
    let desc = BodyDesc::new(
        BodyTag::Pig,
        BodyKind::Dynamic,
        Vec2::new(p.x, p.y),
        ShapeParams::Circle {
            radius: config.rules.pig_radius,
        },
    );
    world.create_body(&with_material(desc, &config.materials.pig))
}

/// A static collectible sensor circle.
pub fn spawn_coin(
    world: &mut PhysicsWorld,
    c: &CoinPlacement,
    config: &GameConfig,
) -> BodyHandle {
    let desc = BodyDesc::new(
        BodyTag::Coin,
        BodyKind::Static,
        Vec2::new(c.x, c.y),
        ShapeParams::Circle { radius: c.radius },
    );
    world.create_body(&with_material(desc, &config.materials.coin))
}

/// A static hazardous sensor box.
pub fn spawn_spike(
    world: &mut PhysicsWorld,
    s: &SpikePlacement,
    config: &GameConfig,
) -> BodyHandle {
    let desc = BodyDesc::new(
        BodyTag::Spike,
        BodyKind::Static,
        Vec2::new(s.x, s.y),
        ShapeParams::Box {
            half_width: s.width / 2.0,
            half_height: s.height / 2.0,
        },
    );
    world.create_body(&with_material(desc, &config.materials.spike))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> ConvertedLevel {
        ConvertedLevel {
            pigs: vec![PigPlacement { x: 20.0, y: 1.0 }, PigPlacement { x: 22.0, y: 1.0 }],
            boxes: vec![BoxPlacement {
                x: 15.0,
                y: 2.0,
                width: 2.0,
                height: 0.5,
            }],
            coins: vec![CoinPlacement {
                x: 10.0,
                y: 5.0,
                radius: 0.4,
            }],
            spikes: vec![SpikePlacement {
                x: 12.0,
                y: 0.5,
                width: 1.0,
                height: 1.0,
            }],
        }
    }

    fn setup() -> (PhysicsWorld, EntityRegistry, GameConfig) {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(config.physics.gravity);
        let mut registry = EntityRegistry::new(&mut world, &config);
        registry.populate(&mut world, &level(), &config);
        (world, registry, config)
    }

    #[test]
    fn populate_creates_tagged_bodies() {
        let (world, registry, _) = setup();
        assert_eq!(world.body_count(), 6);
        assert_eq!(world.count_tagged(BodyTag::Ground), 1);
        assert_eq!(world.count_tagged(BodyTag::Pig), 2);
        assert_eq!(world.count_tagged(BodyTag::Coin), 1);
        assert_eq!(world.count_tagged(BodyTag::Spike), 1);
        assert_eq!(registry.pig_count(), 2);
        assert_eq!(
            world.shape(registry.boxes()[0]),
            Some(ShapeParams::Box {
                half_width: 1.0,
                half_height: 0.25
            })
        );
    }

    #[test]
    fn clear_keeps_only_ground() {
        let (mut world, mut registry, config) = setup();
        world.create_body(&BodyDesc::new(
            BodyTag::Bird,
            BodyKind::Dynamic,
            config.bird.start,
            ShapeParams::Circle { radius: 0.5 },
        ));

        assert_eq!(registry.clear_world_except_ground(&mut world), 6);
        assert_eq!(world.body_count(), 1);
        assert!(world.contains(registry.ground()));
        assert_eq!(registry.pig_count(), 0);
        assert_eq!(registry.coin_count(), 0);
        assert!(registry.boxes().is_empty() && registry.spikes().is_empty());
    }

    #[test]
    fn marks_are_consumed_by_cleanup() {
        let (mut world, mut registry, _) = setup();
        let pig = registry.pigs().next().unwrap();

        assert!(registry.mark_pig(pig));
        assert!(!registry.mark_pig(pig), "second mark is not new");
        assert!(registry.is_pig_marked(pig));
        assert!(world.contains(pig), "marking never destroys");

        assert_eq!(registry.cleanup_pigs(&mut world), 1);
        assert!(!world.contains(pig));
        assert_eq!(registry.pig_count(), 1);
        assert!(registry.pigs().all(|p| p != pig));
        assert_eq!(registry.cleanup_pigs(&mut world), 0);
    }

    #[test]
    fn marked_coins_are_hidden_before_cleanup() {
        let (mut world, mut registry, _) = setup();
        let coin = registry.visible_coins().next().unwrap();
        assert!(registry.mark_coin(coin));
        assert_eq!(registry.visible_coins().count(), 0);
        assert_eq!(registry.cleanup_coins(&mut world), 1);
        assert_eq!(registry.coin_count(), 0);
    }

    #[test]
    fn marking_unknown_handles_is_ignored() {
        let (_world, mut registry, _) = setup();
        let coin = registry.visible_coins().next().unwrap();
        assert!(!registry.mark_pig(coin));
        assert!(!registry.mark_coin(registry.ground()));
    }
}
