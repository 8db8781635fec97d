//! World: the physics scene plus its fixed furniture
//!
//! Owns the solver, the three boundary bodies (ground and two walls) and the
//! zero-size sensor at the viewport center. Boundaries can be removed exactly
//! once and never come back, not even on resize.

use glam::Vec2;

use super::physics::{BodyDesc, BodyHandle, BodyLabel, BodySnapshot, Physics};
use crate::config::Viewport;
use crate::consts::*;

#[derive(Debug, Clone, Copy)]
struct Boundaries {
    ground: BodyHandle,
    left: BodyHandle,
    right: BodyHandle,
}

impl Boundaries {
    fn build<P: Physics>(physics: &mut P, viewport: &Viewport) -> Self {
        let (w, h) = (viewport.width, viewport.height);
        let ground = physics.insert(BodyDesc::fixed(
            BodyLabel::Ground,
            Vec2::new(w / 2.0, h + GROUND_DROP),
            Vec2::new(w.max(MIN_BOUNDARY_SPAN), GROUND_HEIGHT),
        ));
        let wall_size = Vec2::new(WALL_THICKNESS, h.max(MIN_BOUNDARY_SPAN));
        let left = physics.insert(BodyDesc::fixed(
            BodyLabel::WallLeft,
            Vec2::new(-WALL_THICKNESS / 2.0, h / 2.0),
            wall_size,
        ));
        let right = physics.insert(BodyDesc::fixed(
            BodyLabel::WallRight,
            Vec2::new(w + WALL_THICKNESS / 2.0, h / 2.0),
            wall_size,
        ));
        Self {
            ground,
            left,
            right,
        }
    }

    fn handles(&self) -> [BodyHandle; 3] {
        [self.ground, self.left, self.right]
    }

    fn remove<P: Physics>(self, physics: &mut P) {
        for handle in self.handles() {
            physics.remove(handle);
        }
    }
}

fn sensor_desc(viewport: &Viewport) -> BodyDesc {
    BodyDesc::sensor(
        BodyLabel::CenterSensor,
        viewport.center(),
        Vec2::splat(SENSOR_SIZE),
    )
}

/// Physics scene wrapper
pub struct World<P: Physics> {
    physics: P,
    viewport: Viewport,
    boundaries: Option<Boundaries>,
    boundaries_removed: bool,
    sensor: BodyHandle,
}

impl<P: Physics> World<P> {
    pub fn new(mut physics: P, viewport: Viewport, gravity: f32) -> Self {
        physics.set_gravity(gravity);
        let boundaries = Boundaries::build(&mut physics, &viewport);
        let sensor = physics.insert(sensor_desc(&viewport));
        Self {
            physics,
            viewport,
            boundaries: Some(boundaries),
            boundaries_removed: false,
            sensor,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        self.physics.insert(desc)
    }

    /// Returns false if the body was already gone
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.physics.remove(handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.physics.contains(handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<BodySnapshot> {
        self.physics.body(handle)
    }

    /// Advance the solver by one step
    pub fn tick(&mut self, dt_ms: f64) {
        self.physics.step(dt_ms);
    }

    pub fn sensor(&self) -> BodyHandle {
        self.sensor
    }

    pub fn sensor_center(&self) -> Vec2 {
        self.physics
            .body(self.sensor)
            .map(|b| b.position)
            .unwrap_or_else(|| self.viewport.center())
    }

    /// Live word bodies in creation order
    pub fn word_handles(&self) -> Vec<BodyHandle> {
        self.physics
            .handles()
            .into_iter()
            .filter(|h| self.is_word(*h))
            .collect()
    }

    /// Boundary bodies currently in the scene
    pub fn boundary_handles(&self) -> Vec<BodyHandle> {
        self.physics
            .handles()
            .into_iter()
            .filter(|h| {
                self.physics
                    .body(*h)
                    .is_some_and(|b| b.label.is_boundary())
            })
            .collect()
    }

    fn is_word(&self, handle: BodyHandle) -> bool {
        self.physics
            .body(handle)
            .is_some_and(|b| b.label == BodyLabel::Word)
    }

    /// Word bodies ordered by distance to `point`, nearest first.
    /// Equal distances keep creation order.
    pub fn query_near(&self, point: Vec2) -> Vec<BodyHandle> {
        let mut near: Vec<(f32, BodyHandle)> = self
            .word_handles()
            .into_iter()
            .filter_map(|h| {
                self.physics
                    .body(h)
                    .map(|b| (b.position.distance_squared(point), h))
            })
            .collect();
        near.sort_by(|a, b| a.0.total_cmp(&b.0));
        near.into_iter().map(|(_, h)| h).collect()
    }

    /// Word bodies overlapping `sensor`, in creation order
    pub fn query_overlap(&self, sensor: BodyHandle) -> Vec<BodyHandle> {
        self.physics
            .overlapping(sensor)
            .into_iter()
            .filter(|h| self.is_word(*h))
            .collect()
    }

    /// Pull a body out of sleep so velocity and forces act on it
    pub fn wake(&mut self, handle: BodyHandle) {
        self.physics.set_sleeping(handle, false);
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        self.physics.set_velocity(handle, velocity);
    }

    pub fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) {
        self.physics.set_angular_velocity(handle, angular_velocity);
    }

    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec2) {
        self.physics.apply_force(handle, force);
    }

    pub fn boundaries_removed(&self) -> bool {
        self.boundaries_removed
    }

    /// Delete ground and walls. One-way; returns true only on the call that removed them.
    pub fn remove_boundaries(&mut self) -> bool {
        if self.boundaries_removed {
            return false;
        }
        if let Some(boundaries) = self.boundaries.take() {
            boundaries.remove(&mut self.physics);
        }
        self.boundaries_removed = true;
        log::info!("Boundaries removed");
        true
    }

    /// Rebuild boundaries for a new viewport (unless removed) and re-center the sensor
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if !self.boundaries_removed {
            if let Some(old) = self.boundaries.take() {
                old.remove(&mut self.physics);
            }
            self.boundaries = Some(Boundaries::build(&mut self.physics, &self.viewport));
        }
        self.physics.remove(self.sensor);
        self.sensor = self.physics.insert(sensor_desc(&self.viewport));
        log::debug!(
            "World resized to {}x{}",
            self.viewport.width,
            self.viewport.height
        );
    }
}
