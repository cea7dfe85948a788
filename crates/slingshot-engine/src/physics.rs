//! rapier2d physics world adapter.
//!
//! [`PhysicsWorld`] owns a rapier2d simulation and exposes the small surface
//! the game needs: create and destroy bodies, read and push their motion,
//! and step the world. Every body carries a [`BodyTag`] assigned at creation
//! so contact reactions can dispatch on what was hit.
//!
//! # Contact callbacks
//!
//! [`PhysicsWorld::step`] invokes a [`ContactListener`] before returning:
//! `begin_contact` once per pair of colliders that started touching during
//! the step, and `post_solve` once per touching pair that received a
//! non-zero normal impulse. The listener only gets tagged handles and
//! impulses, never the world, so it cannot destroy a body while rapier's
//! contact graph is still being consumed.
//!
//! # Determinism
//!
//! rapier2d is compiled with `enhanced-determinism`. Begin-contact events are
//! sorted by body handle before delivery, so the same world and inputs give
//! the same callback order on every run.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector in simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn to_rapier(self) -> Vector<Real> {
        vector![self.x as Real, self.y as Real]
    }

    fn from_rapier(v: &Vector<Real>) -> Self {
        Self::new(v.x as f64, v.y as f64)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Body descriptors
// ---------------------------------------------------------------------------

/// What a body is, from the game's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyTag {
    Ground,
    Box,
    Pig,
    Coin,
    Spike,
    Bird,
}

/// Whether the solver moves the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// Collision geometry of a body, in body-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeParams {
    Circle { radius: f64 },
    /// Axis-aligned (before rotation) box with half-extents.
    Box { half_width: f64, half_height: f64 },
    /// A line segment, used for the ground edge.
    Segment { a: Vec2, b: Vec2 },
}

/// Everything needed to create a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub tag: BodyTag,
    pub kind: BodyKind,
    pub position: Vec2,
    pub shape: ShapeParams,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub sensor: bool,
    pub linear_damping: f64,
    pub angular_damping: f64,
}

impl BodyDesc {
    /// A descriptor with zeroed material and no damping.
    pub fn new(tag: BodyTag, kind: BodyKind, position: Vec2, shape: ShapeParams) -> Self {
        Self {
            tag,
            kind,
            position,
            shape,
            density: 0.0,
            friction: 0.0,
            restitution: 0.0,
            sensor: false,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn material(mut self, density: f64, friction: f64, restitution: f64, sensor: bool) -> Self {
        self.density = density;
        self.friction = friction;
        self.restitution = restitution;
        self.sensor = sensor;
        self
    }

    pub fn damping(mut self, linear: f64, angular: f64) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Reject parameters rapier cannot build a sane body from.
    ///
    /// # Panics
    ///
    /// Panics on non-finite positions, non-positive extents, or negative
    /// material values. These are programmer errors.
    fn assert_valid(&self) {
        assert!(
            self.position.is_finite(),
            "{:?} body position must be finite, got {:?}",
            self.tag,
            self.position
        );
        match self.shape {
            ShapeParams::Circle { radius } => assert!(
                radius > 0.0 && radius.is_finite(),
                "{:?} circle radius must be positive, got {radius}",
                self.tag
            ),
            ShapeParams::Box {
                half_width,
                half_height,
            } => assert!(
                half_width > 0.0
                    && half_height > 0.0
                    && half_width.is_finite()
                    && half_height.is_finite(),
                "{:?} box half-extents must be positive, got {half_width}x{half_height}",
                self.tag
            ),
            ShapeParams::Segment { a, b } => assert!(
                a.is_finite() && b.is_finite() && a != b,
                "{:?} segment endpoints must be finite and distinct",
                self.tag
            ),
        }
        assert!(
            self.density >= 0.0
                && self.friction >= 0.0
                && self.restitution >= 0.0
                && self.linear_damping >= 0.0
                && self.angular_damping >= 0.0,
            "{:?} material values must be non-negative",
            self.tag
        );
    }
}

/// Opaque handle to a body in a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

impl BodyHandle {
    /// Index and generation, for stable ordering.
    pub fn raw_parts(self) -> (u32, u32) {
        self.0.into_raw_parts()
    }
}

/// A body handle together with its tag, as delivered to contact listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyRef {
    pub handle: BodyHandle,
    pub tag: BodyTag,
}

/// Normal impulses resolved for each contact point of a touching pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactImpulse {
    pub normal_impulses: Vec<f64>,
}

/// Receives contact events from [`PhysicsWorld::step`].
pub trait ContactListener {
    /// Two colliders started touching (or, for sensors, overlapping).
    fn begin_contact(&mut self, a: BodyRef, b: BodyRef);

    /// The solver resolved a contact between two solid colliders.
    fn post_solve(&mut self, a: BodyRef, b: BodyRef, impulse: &ContactImpulse);
}

/// A listener that ignores everything.
impl ContactListener for () {
    fn begin_contact(&mut self, _a: BodyRef, _b: BodyRef) {}

    fn post_solve(&mut self, _a: BodyRef, _b: BodyRef, _impulse: &ContactImpulse) {}
}

/// Event counts from one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    pub begin_contacts: usize,
    pub post_solves: usize,
}

#[derive(Debug, Clone, Copy)]
struct BodyRecord {
    tag: BodyTag,
    shape: ShapeParams,
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Owns the rapier2d simulation state.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Tag and shape of every live body.
    bodies: HashMap<RigidBodyHandle, BodyRecord>,
    /// Maps rapier ColliderHandle -> owning body, for contact lookup.
    collider_to_body: HashMap<ColliderHandle, RigidBodyHandle>,
}

impl PhysicsWorld {
    /// Create an empty world with the given gravity vector.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: gravity.to_rapier(),
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: HashMap::new(),
            collider_to_body: HashMap::new(),
        }
    }

    /// Create a body with one collider.
    ///
    /// # Panics
    ///
    /// Panics if the descriptor is invalid (see [`BodyDesc`]).
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        desc.assert_valid();

        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .linear_damping(desc.linear_damping as Real)
                .angular_damping(desc.angular_damping as Real)
                .can_sleep(true)
                .ccd_enabled(true),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let rb = builder.translation(desc.position.to_rapier()).build();
        let body_handle = self.rigid_body_set.insert(rb);

        let shape = match desc.shape {
            ShapeParams::Circle { radius } => SharedShape::ball(radius as Real),
            ShapeParams::Box {
                half_width,
                half_height,
            } => SharedShape::cuboid(half_width as Real, half_height as Real),
            ShapeParams::Segment { a, b } => SharedShape::segment(
                point![a.x as Real, a.y as Real],
                point![b.x as Real, b.y as Real],
            ),
        };
        let collider = ColliderBuilder::new(shape)
            .density(desc.density as Real)
            .friction(desc.friction as Real)
            .restitution(desc.restitution as Real)
            .sensor(desc.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.collider_to_body.insert(collider_handle, body_handle);
        self.bodies.insert(
            body_handle,
            BodyRecord {
                tag: desc.tag,
                shape: desc.shape,
            },
        );
        tracing::trace!(tag = ?desc.tag, x = desc.position.x, y = desc.position.y, "body created");
        BodyHandle(body_handle)
    }

    /// Remove a body and its colliders. Returns `false` if it was not live.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        if self.bodies.remove(&handle.0).is_none() {
            return false;
        }
        self.rigid_body_set.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
        self.collider_to_body.retain(|_, body| *body != handle.0);
        true
    }

    /// Destroy every body except `keep`. Returns how many were destroyed.
    pub fn destroy_all_except(&mut self, keep: BodyHandle) -> usize {
        let doomed: Vec<RigidBodyHandle> = self
            .bodies
            .keys()
            .copied()
            .filter(|h| *h != keep.0)
            .collect();
        doomed
            .into_iter()
            .filter(|h| self.destroy_body(BodyHandle(*h)))
            .count()
    }

    /// Advance the simulation by `dt` seconds and deliver contact events.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is not positive and finite, or `velocity_iterations`
    /// is zero.
    pub fn step(
        &mut self,
        dt: f64,
        velocity_iterations: usize,
        position_iterations: usize,
        listener: &mut dyn ContactListener,
    ) -> StepReport {
        assert!(
            dt > 0.0 && dt.is_finite(),
            "dt must be positive and finite, got {dt}"
        );
        self.integration_params.dt = dt as Real;
        self.integration_params.num_solver_iterations = NonZeroUsize::new(velocity_iterations)
            .expect("velocity_iterations must be at least 1");
        self.integration_params.num_internal_stabilization_iterations = position_iterations;

        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None, // query pipeline (unused)
            &(),  // physics hooks
            &event_handler,
        );

        let mut report = StepReport::default();

        // Begin-contact: newly started pairs, sorted for deterministic delivery.
        let mut started = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _flags) = event {
                if let (Some(a), Some(b)) = (self.body_ref(h1), self.body_ref(h2)) {
                    started.push((a, b));
                }
            }
        }
        started.sort_by_key(|(a, b)| {
            let (a, b) = (a.handle.raw_parts(), b.handle.raw_parts());
            (a.min(b), a.max(b))
        });
        for (a, b) in started {
            listener.begin_contact(a, b);
            report.begin_contacts += 1;
        }

        // Post-solve: every touching pair that the solver pushed apart.
        let mut solved = Vec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let normal_impulses: Vec<f64> = pair
                .manifolds
                .iter()
                .flat_map(|m| m.points.iter().map(|p| p.data.impulse as f64))
                .collect();
            if normal_impulses.iter().all(|i| *i == 0.0) {
                continue;
            }
            let bodies = (self.body_ref(pair.collider1), self.body_ref(pair.collider2));
            if let (Some(a), Some(b)) = bodies {
                solved.push((a, b, ContactImpulse { normal_impulses }));
            }
        }
        solved.sort_by_key(|(a, b, _)| (a.handle.raw_parts(), b.handle.raw_parts()));
        for (a, b, impulse) in &solved {
            listener.post_solve(*a, *b, impulse);
            report.post_solves += 1;
        }

        report
    }

    fn body_ref(&self, collider: ColliderHandle) -> Option<BodyRef> {
        let body = *self.collider_to_body.get(&collider)?;
        let record = self.bodies.get(&body)?;
        Some(BodyRef {
            handle: BodyHandle(body),
            tag: record.tag,
        })
    }

    fn rigid_body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        if !self.bodies.contains_key(&handle.0) {
            return None;
        }
        self.rigid_body_set.get(handle.0)
    }

    fn rigid_body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        if !self.bodies.contains_key(&handle.0) {
            return None;
        }
        self.rigid_body_set.get_mut(handle.0)
    }

    // -- queries ------------------------------------------------------------

    /// Whether the handle refers to a live body.
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle.0)
    }

    pub fn tag(&self, handle: BodyHandle) -> Option<BodyTag> {
        self.bodies.get(&handle.0).map(|r| r.tag)
    }

    pub fn shape(&self, handle: BodyHandle) -> Option<ShapeParams> {
        self.bodies.get(&handle.0).map(|r| r.shape)
    }

    /// World position of the body's origin.
    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body(handle)
            .map(|rb| Vec2::from_rapier(rb.translation()))
    }

    /// Rotation angle in radians.
    pub fn rotation(&self, handle: BodyHandle) -> Option<f64> {
        self.rigid_body(handle).map(|rb| rb.rotation().angle() as f64)
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body(handle)
            .map(|rb| Vec2::from_rapier(rb.linvel()))
    }

    pub fn angular_velocity(&self, handle: BodyHandle) -> Option<f64> {
        self.rigid_body(handle).map(|rb| rb.angvel() as f64)
    }

    /// Number of live bodies, the ground included.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live bodies with the given tag.
    pub fn count_tagged(&self, tag: BodyTag) -> usize {
        self.bodies.values().filter(|r| r.tag == tag).count()
    }

    // -- mutation -------------------------------------------------------------

    /// Zero linear and angular velocity. No-op for dead handles.
    pub fn stop(&mut self, handle: BodyHandle) {
        if let Some(rb) = self.rigid_body_mut(handle) {
            rb.set_linvel(vector![0.0, 0.0], true);
            rb.set_angvel(0.0, true);
        }
    }

    /// Apply an instantaneous impulse at the center of mass.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(rb) = self.rigid_body_mut(handle) {
            rb.apply_impulse(impulse.to_rapier(), true);
        }
    }

    /// Overwrite the body's linear velocity.
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.rigid_body_mut(handle) {
            rb.set_linvel(velocity.to_rapier(), true);
        }
    }

    /// Teleport the body. Used by tests and tooling to place bodies directly.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(rb) = self.rigid_body_mut(handle) {
            rb.set_translation(position.to_rapier(), true);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[derive(Default)]
    struct Recorder {
        begins: Vec<(BodyTag, BodyTag)>,
        solves: Vec<(BodyTag, BodyTag, ContactImpulse)>,
    }

    impl ContactListener for Recorder {
        fn begin_contact(&mut self, a: BodyRef, b: BodyRef) {
            self.begins.push((a.tag, b.tag));
        }

        fn post_solve(&mut self, a: BodyRef, b: BodyRef, impulse: &ContactImpulse) {
            self.solves.push((a.tag, b.tag, impulse.clone()));
        }
    }

    fn ball(tag: BodyTag, position: Vec2) -> BodyDesc {
        BodyDesc::new(
            tag,
            BodyKind::Dynamic,
            position,
            ShapeParams::Circle { radius: 0.5 },
        )
        .material(1.0, 0.5, 0.0, false)
    }

    fn wall(tag: BodyTag, position: Vec2, sensor: bool) -> BodyDesc {
        BodyDesc::new(
            tag,
            BodyKind::Static,
            position,
            ShapeParams::Box {
                half_width: 0.5,
                half_height: 5.0,
            },
        )
        .material(1.0, 0.5, 0.0, sensor)
    }

    fn has_pair(pairs: &[(BodyTag, BodyTag)], x: BodyTag, y: BodyTag) -> bool {
        pairs
            .iter()
            .any(|&(a, b)| (a == x && b == y) || (a == y && b == x))
    }

    #[test]
    fn create_and_destroy_body() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let h = pw.create_body(&ball(BodyTag::Bird, Vec2::new(1.0, 2.0)));

        assert!(pw.contains(h));
        assert_eq!(pw.tag(h), Some(BodyTag::Bird));
        assert_eq!(pw.position(h), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(pw.body_count(), 1);

        assert!(pw.destroy_body(h));
        assert!(!pw.contains(h));
        assert_eq!(pw.position(h), None);
        assert_eq!(pw.body_count(), 0);
    }

    #[test]
    fn destroying_twice_is_a_noop() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let h = pw.create_body(&ball(BodyTag::Pig, Vec2::ZERO));
        assert!(pw.destroy_body(h));
        assert!(!pw.destroy_body(h));
    }

    #[test]
    fn destroy_all_except_keeps_one() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let keep = pw.create_body(&wall(BodyTag::Ground, Vec2::ZERO, false));
        for i in 0..4 {
            pw.create_body(&ball(BodyTag::Pig, Vec2::new(i as f64 * 3.0, 10.0)));
        }
        assert_eq!(pw.destroy_all_except(keep), 4);
        assert_eq!(pw.body_count(), 1);
        assert!(pw.contains(keep));
    }

    #[test]
    #[should_panic(expected = "circle radius must be positive")]
    fn zero_radius_panics() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        pw.create_body(&BodyDesc::new(
            BodyTag::Coin,
            BodyKind::Static,
            Vec2::ZERO,
            ShapeParams::Circle { radius: 0.0 },
        ));
    }

    #[test]
    #[should_panic(expected = "dt must be positive")]
    fn zero_dt_panics() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        pw.step(0.0, 8, 3, &mut ());
    }

    #[test]
    fn gravity_pulls_dynamic_body() {
        let mut pw = PhysicsWorld::new(Vec2::new(0.0, -10.0));
        let h = pw.create_body(&ball(BodyTag::Bird, Vec2::new(0.0, 10.0)));
        for _ in 0..60 {
            pw.step(DT, 8, 3, &mut ());
        }
        assert!(pw.position(h).unwrap().y < 10.0);
        assert!(pw.linear_velocity(h).unwrap().y < 0.0);
    }

    #[test]
    fn impulse_sets_velocity_by_mass() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let h = pw.create_body(&ball(BodyTag::Bird, Vec2::ZERO));
        pw.apply_impulse(h, Vec2::new(5.0, 0.0));
        pw.step(DT, 8, 3, &mut ());
        assert!(pw.linear_velocity(h).unwrap().x > 0.0);

        pw.stop(h);
        assert_eq!(pw.linear_velocity(h), Some(Vec2::ZERO));
        assert_eq!(pw.angular_velocity(h), Some(0.0));
    }

    #[test]
    fn solid_collision_reports_begin_and_post_solve() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let b = pw.create_body(&ball(BodyTag::Bird, Vec2::ZERO));
        pw.set_linear_velocity(b, Vec2::new(30.0, 0.0));
        pw.create_body(&wall(BodyTag::Box, Vec2::new(3.0, 0.0), false));

        let mut rec = Recorder::default();
        for _ in 0..60 {
            pw.step(DT, 8, 3, &mut rec);
        }

        assert!(has_pair(&rec.begins, BodyTag::Bird, BodyTag::Box));
        let max_impulse = rec
            .solves
            .iter()
            .flat_map(|(_, _, i)| i.normal_impulses.iter().copied())
            .fold(0.0f64, f64::max);
        assert!(
            max_impulse > 0.0,
            "fast impact should resolve a positive impulse"
        );
    }

    #[test]
    fn sensor_reports_begin_without_response() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let b = pw.create_body(&ball(BodyTag::Bird, Vec2::ZERO));
        pw.set_linear_velocity(b, Vec2::new(30.0, 0.0));
        pw.create_body(&wall(BodyTag::Coin, Vec2::new(3.0, 0.0), true));

        let mut rec = Recorder::default();
        for _ in 0..30 {
            pw.step(DT, 8, 3, &mut rec);
        }

        assert!(has_pair(&rec.begins, BodyTag::Bird, BodyTag::Coin));
        assert!(rec.solves.is_empty(), "sensors never reach the solver");
        assert!(
            pw.position(b).unwrap().x > 4.0,
            "bird should pass through the sensor"
        );
    }

    #[test]
    fn destroyed_bodies_stop_reporting() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        let b = pw.create_body(&ball(BodyTag::Bird, Vec2::ZERO));
        pw.set_linear_velocity(b, Vec2::new(30.0, 0.0));
        let w = pw.create_body(&wall(BodyTag::Spike, Vec2::new(3.0, 0.0), true));
        pw.destroy_body(w);

        let mut rec = Recorder::default();
        for _ in 0..30 {
            pw.step(DT, 8, 3, &mut rec);
        }
        assert!(rec.begins.is_empty());
    }

    #[test]
    fn fast_body_does_not_tunnel_through_ground_edge() {
        let mut pw = PhysicsWorld::new(Vec2::ZERO);
        pw.create_body(&BodyDesc::new(
            BodyTag::Ground,
            BodyKind::Static,
            Vec2::ZERO,
            ShapeParams::Segment {
                a: Vec2::new(-100.0, 0.0),
                b: Vec2::new(100.0, 0.0),
            },
        ));
        // Ten units per tick toward a zero-thickness edge.
        let h = pw.create_body(&ball(BodyTag::Pig, Vec2::new(0.0, 5.0)));
        pw.set_linear_velocity(h, Vec2::new(0.0, -600.0));

        let mut rec = Recorder::default();
        for _ in 0..10 {
            pw.step(DT, 8, 3, &mut rec);
        }
        assert!(pw.position(h).unwrap().y > 0.0, "ball crossed the edge");
        assert!(has_pair(&rec.begins, BodyTag::Pig, BodyTag::Ground));
    }

    #[test]
    fn identical_runs_are_deterministic() {
        fn run() -> Vec<(f64, f64)> {
            let mut pw = PhysicsWorld::new(Vec2::new(0.0, -10.0));
            pw.create_body(
                &BodyDesc::new(
                    BodyTag::Ground,
                    BodyKind::Static,
                    Vec2::ZERO,
                    ShapeParams::Segment {
                        a: Vec2::new(-100.0, 0.0),
                        b: Vec2::new(100.0, 0.0),
                    },
                )
                .material(0.0, 0.8, 0.0, false),
            );
            let h = pw.create_body(&ball(BodyTag::Bird, Vec2::new(0.0, 5.0)));
            pw.apply_impulse(h, Vec2::new(3.0, 2.0));
            (0..120)
                .map(|_| {
                    pw.step(DT, 8, 3, &mut ());
                    let p = pw.position(h).unwrap();
                    (p.x, p.y)
                })
                .collect()
        }
        assert_eq!(run(), run());
    }
}
