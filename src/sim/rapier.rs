//! Rigid-body solver backed by rapier2d
//!
//! Words are dynamic cuboids with continuous collision detection so fast
//! drops and blast kicks cannot pass through the ground or walls. Boundaries
//! and the center sensor are fixed colliders. Rapier owns sleeping.
//!
//! Rapier works in seconds. The `Physics` trait speaks DOM-physics units:
//! velocities in px per base step (1/60 s), forces in mass·px/ms² with mass
//! equal to area × 0.001. Everything is converted at this boundary.

use std::collections::BTreeMap;

use glam::Vec2;
use rapier2d::parry::query::intersection_test;
use rapier2d::prelude::*;

use super::physics::{BodyDesc, BodyHandle, BodyLabel, BodySnapshot, Physics};

/// Base steps per second the velocity units are expressed in
const STEPS_PER_S: f32 = 60.0;
/// Gravity scalar to px/s²
const GRAVITY_PX_S2: f32 = 1000.0;
/// mass·px/ms² to mass·px/s²
const FORCE_SCALE: f32 = 1.0e6;
/// Mass per px² of body area
const DENSITY: f32 = 0.001;
const FRICTION: f32 = 0.5;
/// Air drag, about 1% of velocity per base step
const AIR_DAMPING: f32 = 0.6;
/// Pixels per solver length unit (scales contact and sleep tolerances)
const PX_PER_UNIT: f32 = 100.0;
const MIN_HALF_EXTENT: f32 = 0.5;

fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_na(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    label: BodyLabel,
    size: Vec2,
    is_static: bool,
    is_sensor: bool,
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// Default `Physics` backend
pub struct RapierPhysics {
    entries: BTreeMap<BodyHandle, Entry>,
    next_id: u32,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    /// Bodies holding a force for the next step only
    pushed: Vec<RigidBodyHandle>,
}

impl Default for RapierPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierPhysics {
    pub fn new() -> Self {
        let mut params = IntegrationParameters::default();
        params.length_unit = PX_PER_UNIT;
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
            gravity: vector![0.0, GRAVITY_PX_S2],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            pushed: Vec::new(),
        }
    }

    /// Rapier handle of a movable body
    fn dynamic(&self, handle: BodyHandle) -> Option<RigidBodyHandle> {
        self.entries
            .get(&handle)
            .filter(|e| !e.is_static)
            .map(|e| e.body)
    }

    fn build_body(desc: &BodyDesc) -> RigidBody {
        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linear_damping(AIR_DAMPING)
                .angular_damping(AIR_DAMPING)
                .ccd_enabled(true)
        };
        builder
            .translation(to_na(desc.position))
            .rotation(desc.angle)
            .build()
    }

    fn build_collider(desc: &BodyDesc) -> Collider {
        let half = (desc.size * 0.5).max(Vec2::splat(MIN_HALF_EXTENT));
        ColliderBuilder::cuboid(half.x, half.y)
            .density(DENSITY)
            .friction(FRICTION)
            .restitution(0.0)
            .sensor(desc.is_sensor)
            .build()
    }
}

impl Physics for RapierPhysics {
    fn insert(&mut self, desc: BodyDesc) -> BodyHandle {
        let body = self.bodies.insert(Self::build_body(&desc));
        let collider =
            self.colliders
                .insert_with_parent(Self::build_collider(&desc), body, &mut self.bodies);

        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            handle,
            Entry {
                label: desc.label,
                size: desc.size,
                is_static: desc.is_static,
                is_sensor: desc.is_sensor,
                body,
                collider,
            },
        );
        handle
    }

    fn remove(&mut self, handle: BodyHandle) -> bool {
        let Some(entry) = self.entries.remove(&handle) else {
            return false;
        };
        self.bodies.remove(
            entry.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.pushed.retain(|b| *b != entry.body);
        true
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn body(&self, handle: BodyHandle) -> Option<BodySnapshot> {
        let entry = self.entries.get(&handle)?;
        let rb = self.bodies.get(entry.body)?;
        Some(BodySnapshot {
            handle,
            label: entry.label,
            position: from_na(rb.translation()),
            size: entry.size,
            angle: rb.rotation().angle(),
            velocity: from_na(rb.linvel()) / STEPS_PER_S,
            angular_velocity: rb.angvel() / STEPS_PER_S,
            is_static: entry.is_static,
            is_sensor: entry.is_sensor,
            sleeping: !entry.is_static && rb.is_sleeping(),
        })
    }

    fn handles(&self) -> Vec<BodyHandle> {
        self.entries.keys().copied().collect()
    }

    fn set_gravity(&mut self, gravity: f32) {
        self.gravity = vector![0.0, gravity * GRAVITY_PX_S2];
    }

    fn step(&mut self, dt_ms: f64) {
        if dt_ms <= 0.0 {
            return;
        }
        self.params.dt = (dt_ms / 1000.0) as f32;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );

        for body in self.pushed.drain(..) {
            if let Some(rb) = self.bodies.get_mut(body) {
                rb.reset_forces(false);
            }
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.dynamic(handle).and_then(|b| self.bodies.get_mut(b)) {
            rb.set_linvel(to_na(velocity * STEPS_PER_S), true);
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) {
        if let Some(rb) = self.dynamic(handle).and_then(|b| self.bodies.get_mut(b)) {
            rb.set_angvel(angular_velocity * STEPS_PER_S, true);
        }
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) {
        let Some(body) = self.dynamic(handle) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.add_force(to_na(force * FORCE_SCALE), true);
            self.pushed.push(body);
        }
    }

    fn set_sleeping(&mut self, handle: BodyHandle, sleeping: bool) {
        if let Some(rb) = self.dynamic(handle).and_then(|b| self.bodies.get_mut(b)) {
            if sleeping {
                rb.sleep();
            } else {
                rb.wake_up(true);
            }
        }
    }

    fn overlapping(&self, handle: BodyHandle) -> Vec<BodyHandle> {
        let Some(target) = self
            .entries
            .get(&handle)
            .and_then(|e| self.colliders.get(e.collider))
        else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|(other, _)| **other != handle)
            .filter(|(_, entry)| {
                self.colliders.get(entry.collider).is_some_and(|c| {
                    intersection_test(target.position(), target.shape(), c.position(), c.shape())
                        .unwrap_or(false)
                })
            })
            .map(|(h, _)| *h)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::sim::physics::Aabb;

    fn floor(physics: &mut RapierPhysics) -> BodyHandle {
        physics.insert(BodyDesc::fixed(
            BodyLabel::Ground,
            Vec2::new(0.0, 530.0),
            Vec2::new(2000.0, 60.0),
        ))
    }

    fn word_at(physics: &mut RapierPhysics, pos: Vec2) -> BodyHandle {
        physics.insert(BodyDesc::dynamic(BodyLabel::Word, pos, Vec2::new(100.0, 40.0)))
    }

    fn run(physics: &mut RapierPhysics, steps: usize) {
        for _ in 0..steps {
            physics.step(SIM_DT_MS);
        }
    }

    #[test]
    fn test_falls_under_gravity() {
        let mut physics = RapierPhysics::new();
        physics.set_gravity(0.5);
        let word = word_at(&mut physics, Vec2::ZERO);
        run(&mut physics, 10);
        let body = physics.body(word).unwrap();
        assert!(body.position.y > 0.0);
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn test_rests_on_ground_and_sleeps() {
        let mut physics = RapierPhysics::new();
        physics.set_gravity(0.5);
        floor(&mut physics);
        let word = word_at(&mut physics, Vec2::new(0.0, 300.0));
        run(&mut physics, 600);
        let body = physics.body(word).unwrap();
        // Ground top is at 500, word half height is 20
        assert!(body.position.y < 481.0, "sank to {}", body.position.y);
        assert!(body.position.y > 478.0, "floats at {}", body.position.y);
        assert!(body.sleeping);
    }

    #[test]
    fn test_fast_word_does_not_tunnel() {
        let mut physics = RapierPhysics::new();
        floor(&mut physics);
        let word = word_at(&mut physics, Vec2::new(0.0, 300.0));
        // Several ground thicknesses per step
        physics.set_velocity(word, Vec2::new(0.0, 300.0));
        run(&mut physics, 120);
        let body = physics.body(word).unwrap();
        assert!(body.position.y < 500.0, "passed through to {}", body.position.y);
    }

    #[test]
    fn test_velocity_in_base_step_units() {
        let mut physics = RapierPhysics::new();
        physics.set_gravity(0.0);
        let word = word_at(&mut physics, Vec2::ZERO);
        physics.set_velocity(word, Vec2::new(10.0, 0.0));
        assert!((physics.body(word).unwrap().velocity.x - 10.0).abs() < 1e-4);

        physics.step(SIM_DT_MS);
        let moved = physics.body(word).unwrap().position.x;
        assert!((9.5..=10.01).contains(&moved), "moved {moved}");
    }

    #[test]
    fn test_force_lasts_one_step() {
        let mut physics = RapierPhysics::new();
        physics.set_gravity(0.0);
        let word = word_at(&mut physics, Vec2::ZERO);
        physics.apply_force(word, Vec2::new(0.001, 0.0));
        physics.step(SIM_DT_MS);
        let pushed = physics.body(word).unwrap().velocity.x;
        assert!(pushed > 0.0);

        physics.step(SIM_DT_MS);
        assert!(physics.body(word).unwrap().velocity.x <= pushed);
    }

    #[test]
    fn test_sleep_and_wake() {
        let mut physics = RapierPhysics::new();
        let word = word_at(&mut physics, Vec2::ZERO);
        physics.set_sleeping(word, true);
        assert!(physics.body(word).unwrap().sleeping);
        physics.set_sleeping(word, false);
        assert!(!physics.body(word).unwrap().sleeping);
    }

    #[test]
    fn test_sensor_overlaps_without_blocking() {
        let mut physics = RapierPhysics::new();
        let sensor = physics.insert(BodyDesc::sensor(
            BodyLabel::CenterSensor,
            Vec2::new(0.0, 100.0),
            Vec2::ONE,
        ));
        let word = word_at(&mut physics, Vec2::new(0.0, 100.0));
        assert_eq!(physics.overlapping(sensor), vec![word]);

        physics.set_velocity(word, Vec2::new(0.0, 40.0));
        physics.step(SIM_DT_MS);
        assert!(physics.body(word).unwrap().position.y > 130.0);
        assert!(physics.overlapping(sensor).is_empty());
    }

    #[test]
    fn test_stacked_words_separate() {
        let mut physics = RapierPhysics::new();
        physics.set_gravity(0.5);
        floor(&mut physics);
        let low = word_at(&mut physics, Vec2::new(0.0, 470.0));
        let high = word_at(&mut physics, Vec2::new(10.0, 450.0));
        run(&mut physics, 300);
        let (low, high) = (physics.body(low).unwrap(), physics.body(high).unwrap());
        let a = Aabb::of_rotated(low.position, low.size, low.angle);
        let b = Aabb::of_rotated(high.position, high.size, high.angle);
        let overlap_y = (a.max.y.min(b.max.y) - a.min.y.max(b.min.y)).max(0.0);
        assert!(overlap_y < 2.0, "still interpenetrating by {overlap_y}");
    }

    #[test]
    fn test_remove_twice() {
        let mut physics = RapierPhysics::new();
        let word = word_at(&mut physics, Vec2::ZERO);
        assert!(physics.remove(word));
        assert!(!physics.remove(word));
        assert!(physics.body(word).is_none());
        assert!(physics.overlapping(word).is_empty());
        assert!(physics.handles().is_empty());
    }

    #[test]
    fn test_static_bodies_ignore_setters() {
        let mut physics = RapierPhysics::new();
        let ground = floor(&mut physics);
        physics.set_velocity(ground, Vec2::new(5.0, 5.0));
        physics.apply_force(ground, Vec2::new(5.0, 5.0));
        physics.step(SIM_DT_MS);
        let body = physics.body(ground).unwrap();
        assert_eq!(body.position, Vec2::new(0.0, 530.0));
        assert_eq!(body.velocity, Vec2::ZERO);
        assert!(!body.sleeping);
    }
}
