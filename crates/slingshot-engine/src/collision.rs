//! Collision reactions: physics contacts to gameplay effects.
//!
//! A [`CollisionReactor`] is handed to [`PhysicsWorld::step`] as its contact
//! listener. It sees the bird handle and launch flag as they were when the
//! step began, and only records what should happen:
//!
//! - bird begins touching a coin: the coin is collected;
//! - launched bird begins touching a spike: the bird dies (at most once per
//!   step);
//! - a pig takes a contact impulse strictly above the destruction threshold:
//!   the pig is destroyed.
//!
//! The game loop applies the resulting [`ContactEffects`] after the step,
//! where destroying bodies is safe.
//!
//! [`PhysicsWorld::step`]: crate::physics::PhysicsWorld::step

use crate::config::ImpulsePolicy;
use crate::physics::{BodyHandle, BodyRef, BodyTag, ContactImpulse, ContactListener};

/// Effects recorded during one physics step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactEffects {
    /// Coins the bird touched, in event order, without duplicates.
    pub collected_coins: Vec<BodyHandle>,
    /// Pigs hit hard enough to die, in event order, without duplicates.
    pub destroyed_pigs: Vec<BodyHandle>,
    /// The launched bird touched a spike.
    pub bird_spiked: bool,
}

impl ContactEffects {
    pub fn is_empty(&self) -> bool {
        self.collected_coins.is_empty() && self.destroyed_pigs.is_empty() && !self.bird_spiked
    }
}

/// Contact listener that turns contacts into [`ContactEffects`].
#[derive(Debug, Clone)]
pub struct CollisionReactor {
    bird: Option<BodyHandle>,
    bird_launched: bool,
    destroy_threshold: f64,
    policy: ImpulsePolicy,
    effects: ContactEffects,
}

impl CollisionReactor {
    pub fn new(
        bird: Option<BodyHandle>,
        bird_launched: bool,
        destroy_threshold: f64,
        policy: ImpulsePolicy,
    ) -> Self {
        Self {
            bird,
            bird_launched,
            destroy_threshold,
            policy,
            effects: ContactEffects::default(),
        }
    }

    /// Consume the reactor, yielding what it recorded.
    pub fn into_effects(self) -> ContactEffects {
        self.effects
    }

    pub fn effects(&self) -> &ContactEffects {
        &self.effects
    }

    fn is_bird(&self, body: BodyRef) -> bool {
        body.tag == BodyTag::Bird && Some(body.handle) == self.bird
    }

    fn collect_coin(&mut self, coin: BodyHandle) {
        if !self.effects.collected_coins.contains(&coin) {
            self.effects.collected_coins.push(coin);
        }
    }

    fn destroy_pig(&mut self, pig: BodyHandle) {
        if !self.effects.destroyed_pigs.contains(&pig) {
            self.effects.destroyed_pigs.push(pig);
        }
    }
}

impl ContactListener for CollisionReactor {
    fn begin_contact(&mut self, a: BodyRef, b: BodyRef) {
        for (this, other) in [(a, b), (b, a)] {
            match this.tag {
                BodyTag::Coin if self.is_bird(other) => self.collect_coin(this.handle),
                BodyTag::Spike if self.is_bird(other) && self.bird_launched => {
                    // Later spikes in the same step see a bird that is no
                    // longer flying.
                    self.bird_launched = false;
                    self.effects.bird_spiked = true;
                }
                _ => {}
            }
        }
    }

    fn post_solve(&mut self, a: BodyRef, b: BodyRef, impulse: &ContactImpulse) {
        if a.tag != BodyTag::Pig && b.tag != BodyTag::Pig {
            return;
        }
        let Some(strength) = self.policy.reduce(&impulse.normal_impulses) else {
            return;
        };
        if strength <= self.destroy_threshold {
            return;
        }
        for body in [a, b] {
            if body.tag == BodyTag::Pig {
                self.destroy_pig(body.handle);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, BodyKind, PhysicsWorld, ShapeParams, Vec2};

    /// Real handles for the tags under test, from a throwaway world.
    fn handles() -> (BodyRef, BodyRef, BodyRef, BodyRef, BodyRef) {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let mut make = |tag, x| {
            let handle = pw.create_body(&BodyDesc::new(
                tag,
                BodyKind::Static,
                Vec2::new(x, 0.0),
                ShapeParams::Circle { radius: 0.5 },
            ));
            BodyRef { handle, tag }
        };
        (
            make(BodyTag::Bird, 0.0),
            make(BodyTag::Coin, 2.0),
            make(BodyTag::Spike, 4.0),
            make(BodyTag::Pig, 6.0),
            make(BodyTag::Box, 8.0),
        )
    }

    fn impulse(points: &[f64]) -> ContactImpulse {
        ContactImpulse {
            normal_impulses: points.to_vec(),
        }
    }

    #[test]
    fn bird_collects_coin_in_either_order() {
        let (bird, coin, ..) = handles();
        let mut r = CollisionReactor::new(Some(bird.handle), false, 2.0, ImpulsePolicy::MaxPoint);
        r.begin_contact(coin, bird);
        r.begin_contact(bird, coin);
        assert_eq!(r.effects().collected_coins, vec![coin.handle]);
        assert!(!r.effects().bird_spiked);
    }

    #[test]
    fn coin_ignores_non_bird_bodies() {
        let (bird, coin, _, pig, _) = handles();
        let mut r = CollisionReactor::new(Some(bird.handle), true, 2.0, ImpulsePolicy::MaxPoint);
        r.begin_contact(pig, coin);
        assert!(r.into_effects().is_empty());
    }

    #[test]
    fn stale_bird_handle_does_not_collect() {
        let (bird, coin, ..) = handles();
        let mut r = CollisionReactor::new(None, true, 2.0, ImpulsePolicy::MaxPoint);
        r.begin_contact(bird, coin);
        assert!(r.into_effects().is_empty());
    }

    #[test]
    fn spike_kills_only_a_launched_bird() {
        let (bird, _, spike, ..) = handles();

        let mut resting = CollisionReactor::new(
            Some(bird.handle),
            false,
            2.0,
            ImpulsePolicy::MaxPoint,
        );
        resting.begin_contact(bird, spike);
        assert!(!resting.effects().bird_spiked);

        let mut flying = CollisionReactor::new(
            Some(bird.handle),
            true,
            2.0,
            ImpulsePolicy::MaxPoint,
        );
        flying.begin_contact(spike, bird);
        assert!(flying.effects().bird_spiked);
    }

    #[test]
    fn pig_dies_strictly_above_threshold() {
        let (_, _, _, pig, block) = handles();
        let mut r = CollisionReactor::new(None, false, 2.0, ImpulsePolicy::MaxPoint);

        r.post_solve(pig, block, &impulse(&[2.0]));
        assert!(r.effects().destroyed_pigs.is_empty(), "2.0 is not above 2.0");

        r.post_solve(block, pig, &impulse(&[0.5, 2.01]));
        assert_eq!(r.effects().destroyed_pigs, vec![pig.handle]);

        r.post_solve(pig, block, &impulse(&[9.0]));
        assert_eq!(r.effects().destroyed_pigs.len(), 1, "no duplicates");
    }

    #[test]
    fn first_point_policy_ignores_later_points() {
        let (_, _, _, pig, block) = handles();
        let mut r = CollisionReactor::new(None, false, 2.0, ImpulsePolicy::FirstPoint);
        r.post_solve(pig, block, &impulse(&[0.5, 5.0]));
        assert!(r.effects().destroyed_pigs.is_empty());
    }

    #[test]
    fn empty_impulse_is_ignored() {
        let (_, _, _, pig, block) = handles();
        let mut r = CollisionReactor::new(None, false, 0.0, ImpulsePolicy::Sum);
        r.post_solve(pig, block, &impulse(&[]));
        assert!(r.into_effects().is_empty());
    }

    #[test]
    fn non_pig_contacts_are_ignored() {
        let (bird, _, _, _, block) = handles();
        let mut r = CollisionReactor::new(Some(bird.handle), true, 0.0, ImpulsePolicy::MaxPoint);
        r.post_solve(bird, block, &impulse(&[100.0]));
        assert!(r.into_effects().is_empty());
    }
}
