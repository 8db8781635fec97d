//! Physics capability
//!
//! The rigid-body solver is an external collaborator. The core only needs
//! rectangle bodies, gravity, stepping with sleep, velocity setters, force
//! accumulation and overlap queries, so that is all this trait asks for.
//!
//! Units: positions in px (y down), velocities in px per 1/60 s step,
//! angular velocities in rad per step, forces in mass·px/ms² where mass is
//! area × 0.001.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable identifier of a body inside the solver. Issued in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// What a body is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyLabel {
    Ground,
    WallLeft,
    WallRight,
    CenterSensor,
    Word,
}

impl BodyLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyLabel::Ground => "ground",
            BodyLabel::WallLeft => "wall-left",
            BodyLabel::WallRight => "wall-right",
            BodyLabel::CenterSensor => "center-sensor",
            BodyLabel::Word => "word",
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, BodyLabel::Ground | BodyLabel::WallLeft | BodyLabel::WallRight)
    }
}

/// Axis-aligned rectangle description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub label: BodyLabel,
    /// Center position
    pub position: Vec2,
    pub size: Vec2,
    /// Rotation (radians)
    pub angle: f32,
    pub is_static: bool,
    pub is_sensor: bool,
}

impl BodyDesc {
    /// Static, colliding rectangle
    pub fn fixed(label: BodyLabel, position: Vec2, size: Vec2) -> Self {
        Self {
            label,
            position,
            size,
            angle: 0.0,
            is_static: true,
            is_sensor: false,
        }
    }

    /// Static, non-colliding rectangle
    pub fn sensor(label: BodyLabel, position: Vec2, size: Vec2) -> Self {
        Self {
            is_sensor: true,
            ..Self::fixed(label, position, size)
        }
    }

    /// Free-moving rectangle
    pub fn dynamic(label: BodyLabel, position: Vec2, size: Vec2) -> Self {
        Self {
            is_static: false,
            ..Self::fixed(label, position, size)
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }
}

/// Read-only view of a body after the last step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub handle: BodyHandle,
    pub label: BodyLabel,
    pub position: Vec2,
    pub size: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub is_static: bool,
    pub is_sensor: bool,
    pub sleeping: bool,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Bounds of a rectangle of `size` rotated by `angle` about its center
    pub fn of_rotated(center: Vec2, size: Vec2, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let (s, c) = (s.abs(), c.abs());
        let half = Vec2::new(
            c * size.x * 0.5 + s * size.y * 0.5,
            s * size.x * 0.5 + c * size.y * 0.5,
        );
        Self::from_center(center, half)
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

/// Rigid-body solver capability
pub trait Physics {
    fn insert(&mut self, desc: BodyDesc) -> BodyHandle;
    /// Returns false if the body was already gone
    fn remove(&mut self, handle: BodyHandle) -> bool;
    fn contains(&self, handle: BodyHandle) -> bool;
    fn body(&self, handle: BodyHandle) -> Option<BodySnapshot>;
    /// All bodies, ordered by handle
    fn handles(&self) -> Vec<BodyHandle>;

    /// Global downward gravity scalar
    fn set_gravity(&mut self, gravity: f32);
    /// Advance by `dt_ms`
    fn step(&mut self, dt_ms: f64);

    /// Velocity and force setters wake the body; static bodies ignore them
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32);
    /// Accumulate a force at the body's center for the next step only
    fn apply_force(&mut self, handle: BodyHandle, force: Vec2);
    fn set_sleeping(&mut self, handle: BodyHandle, sleeping: bool);

    /// Bodies whose shapes intersect `handle`'s shape, ordered by handle
    fn overlapping(&self, handle: BodyHandle) -> Vec<BodyHandle>;
}
