//! Property tests for projectile accounting and pig destruction.

use proptest::prelude::*;
use slingshot_engine::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Action {
    Launch,
    Spike,
    OutOfBounds,
    Wait(u8),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Launch),
        2 => Just(Action::Spike),
        2 => Just(Action::OutOfBounds),
        1 => (1u8..20).prop_map(Action::Wait),
    ]
}

fn spike_level() -> Level {
    let doc: LevelDocument = serde_json::from_value(serde_json::json!({
        "blocks": [
            { "type": "block", "x": 1200, "y": 600, "width": 120, "height": 20 },
            { "type": "pig", "x": 1200, "y": 585 },
            { "type": "spike", "x": 600, "y": 15, "width": 60, "height": 30 }
        ]
    }))
    .unwrap();
    Level::new("spikes", doc)
}

fn bird_position(game: &GameLoop) -> Option<Vec2> {
    game.session().bird.and_then(|b| game.world().position(b))
}

fn move_bird(game: &mut GameLoop, to: Vec2) {
    if let Some(bird) = game.session().bird {
        game.world_mut().set_position(bird, to);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Projectiles drop by exactly one per launch and one per spike death,
    /// never below zero.
    #[test]
    fn projectiles_are_conserved(
        initial in 1u32..6,
        actions in prop::collection::vec(action_strategy(), 1..12),
    ) {
        let mut config = GameConfig::default();
        config.rules.projectiles_per_level = initial;
        // Keep game over and level advance from refilling the budget.
        config.rules.game_over_delay = 1000.0;
        config.rules.level_complete_delay = 1000.0;
        let mut game = GameLoop::new(config, vec![spike_level()]).unwrap();

        for action in actions {
            match action {
                Action::Launch => {
                    if let Some(at) = bird_position(&game) {
                        game.pointer_down(at);
                        game.pointer_move(at - Vec2::new(1.0, -0.5));
                        game.pointer_up();
                    }
                }
                Action::Spike => {
                    if game.session().launched {
                        move_bird(&mut game, Vec2::new(20.0, 0.8));
                    }
                }
                Action::OutOfBounds => {
                    if game.session().launched {
                        move_bird(&mut game, Vec2::new(60.0, 5.0));
                    }
                }
                Action::Wait(ticks) => game.run_ticks(u64::from(ticks)),
            }
            game.run_ticks(2);
            prop_assert!(game.world().count_tagged(BodyTag::Bird) <= 1);
        }

        let consumed = game
            .drain_events()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::BirdLaunched { .. } | GameEvent::BirdKilledBySpike { .. }
                )
            })
            .count() as u32;
        prop_assert_eq!(
            game.session().projectiles_remaining,
            initial.saturating_sub(consumed)
        );
    }

    /// A pig is marked only by impulses strictly above the threshold.
    #[test]
    fn pig_destruction_is_threshold_monotone(
        impulses in prop::collection::vec(0.0f64..5.0, 1..3),
        policy in prop_oneof![
            Just(ImpulsePolicy::FirstPoint),
            Just(ImpulsePolicy::MaxPoint),
            Just(ImpulsePolicy::Sum),
        ],
    ) {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let pig = world.create_body(&BodyDesc::new(
            BodyTag::Pig,
            BodyKind::Dynamic,
            Vec2::ZERO,
            ShapeParams::Circle { radius: 0.3 },
        ));
        let block = world.create_body(&BodyDesc::new(
            BodyTag::Box,
            BodyKind::Static,
            Vec2::new(2.0, 0.0),
            ShapeParams::Box { half_width: 0.5, half_height: 0.5 },
        ));
        let a = BodyRef { handle: pig, tag: BodyTag::Pig };
        let b = BodyRef { handle: block, tag: BodyTag::Box };

        let mut reactor = CollisionReactor::new(None, false, 2.0, policy);
        reactor.post_solve(a, b, &ContactImpulse { normal_impulses: impulses.clone() });

        let strength = policy.reduce(&impulses).unwrap();
        let destroyed = reactor.effects().destroyed_pigs.contains(&pig);
        prop_assert_eq!(destroyed, strength > 2.0);
    }
}
