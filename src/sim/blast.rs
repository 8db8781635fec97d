//! Detonation: boundary removal, outward impulse, decaying wind, burst effects

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::physics::{BodyHandle, Physics};
use super::world::World;
use crate::config::Config;
use crate::consts::*;
use crate::error::soft;
use crate::surface::{Effect, Stage};

/// Speed multiplier for a body `distance` px from the blast center.
/// 1 at the reference distance, capped at 1/0.6 up close, shrinking with distance beyond.
#[inline]
pub fn falloff(distance: f32) -> f32 {
    1.0 / (distance / FALLOFF_REFERENCE_PX).max(FALLOFF_FLOOR)
}

/// Unit vector from `center` to `pos`, measuring distance no shorter than `min_distance`.
/// A body sitting exactly on the center is pushed straight up.
fn outward(center: Vec2, pos: Vec2, min_distance: f32) -> (Vec2, f32) {
    let delta = pos - center;
    let len = delta.length();
    if len <= f32::EPSILON {
        return (Vec2::NEG_Y, min_distance);
    }
    (delta / len, len.max(min_distance))
}

/// What the detonation left behind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlastState {
    pub triggered: bool,
    pub center: Option<Vec2>,
    /// Absolute time the wind stops
    pub wind_deadline_ms: Option<f64>,
}

/// The decaying outward force that follows the impulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub center: Vec2,
    pub deadline_ms: f64,
    pub duration_ms: f64,
    pub base: f32,
    pub chosen: BodyHandle,
}

impl Wind {
    /// Remaining fraction of the window, 1 at detonation down to 0
    pub fn remaining(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        ((self.deadline_ms - now_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Push every non-chosen word outward. False once the deadline has passed.
    pub fn apply<P: Physics>(&self, world: &mut World<P>, now_ms: f64) -> bool {
        if now_ms >= self.deadline_ms {
            return false;
        }
        let t = self.remaining(now_ms);
        let magnitude = self.base * t * t;
        for handle in world.word_handles() {
            if handle == self.chosen {
                continue;
            }
            let Some(body) = world.body(handle) else {
                continue;
            };
            if body.is_static {
                continue;
            }
            let (dir, _) = outward(self.center, body.position, WIND_MIN_DISTANCE);
            world.apply_force(handle, dir * magnitude);
        }
        true
    }
}

pub struct Blast {
    config: Arc<Config>,
    state: BlastState,
    wind: Option<Wind>,
    rng: Pcg32,
}

impl Blast {
    pub fn new(config: Arc<Config>, seed: u64) -> Self {
        Self {
            config,
            state: BlastState::default(),
            wind: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &BlastState {
        &self.state
    }

    pub fn wind(&self) -> Option<&Wind> {
        self.wind.as_ref()
    }

    /// Detonate at the chosen body. Only the first call does anything;
    /// returns the blast center when it fired.
    pub fn trigger<P: Physics>(
        &mut self,
        now_ms: f64,
        chosen: BodyHandle,
        world: &mut World<P>,
        stage: &mut dyn Stage,
    ) -> Option<Vec2> {
        if self.state.triggered {
            log::debug!("Blast already triggered, ignoring");
            return None;
        }
        let center = world.body(chosen)?.position;
        self.state.triggered = true;

        world.remove_boundaries();
        self.state.center = Some(center);

        self.burst_effects(center, stage);

        let cfg = Arc::clone(&self.config);
        let mut kicked = 0;
        for handle in world.word_handles() {
            if handle == chosen {
                continue;
            }
            let Some(body) = world.body(handle) else {
                continue;
            };
            world.wake(handle);
            let (dir, distance) = outward(center, body.position, IMPULSE_MIN_DISTANCE);
            let jitter = self.rng.random_range(IMPULSE_JITTER_MIN..IMPULSE_JITTER_MAX);
            let speed = cfg.blast_strength * falloff(distance) * jitter;
            world.set_velocity(handle, dir * speed);
            let spin = (self.rng.random::<f32>() - 0.5) * cfg.blast_spin;
            world.set_angular_velocity(handle, spin);
            kicked += 1;
        }

        let deadline_ms = now_ms + cfg.blast_wind_ms;
        self.state.wind_deadline_ms = Some(deadline_ms);
        self.wind = Some(Wind {
            center,
            deadline_ms,
            duration_ms: cfg.blast_wind_ms,
            base: cfg.blast_wind_force,
            chosen,
        });

        log::info!(
            "Blast at ({:.0}, {:.0}): {kicked} words kicked, wind for {}ms",
            center.x,
            center.y,
            cfg.blast_wind_ms
        );
        Some(center)
    }

    /// Per-tick wind. Drops the wind once its deadline passes.
    pub fn apply_wind<P: Physics>(&mut self, world: &mut World<P>, now_ms: f64) {
        let Some(wind) = self.wind else {
            return;
        };
        if !wind.apply(world, now_ms) {
            self.wind = None;
            log::debug!("Wind ended");
        }
    }

    fn burst_effects(&mut self, center: Vec2, stage: &mut dyn Stage) {
        soft(
            "shockwave",
            stage.spawn_effect(Effect::Shockwave {
                center,
                lifetime_ms: SHOCKWAVE_LIFETIME_MS,
            }),
        );

        let count = self.config.particle_count;
        for i in 0..count {
            let angle = i as f32 / count as f32 * TAU + self.rng.random::<f32>() * PARTICLE_ANGLE_JITTER;
            let len = PARTICLE_MIN_TRAVEL + self.rng.random::<f32>() * self.config.particle_max_len;
            let size = 3.0 + self.rng.random::<f32>() * 4.0;
            let effect = Effect::Particle {
                origin: center,
                travel: Vec2::from_angle(angle) * len,
                size,
                lifetime_ms: PARTICLE_LIFETIME_MS,
            };
            if soft("particle", stage.spawn_effect(effect)).is_none() {
                break;
            }
        }

        soft(
            "camera shake",
            stage.shake(self.config.shake_ms, self.config.shake_mag),
        );
    }
}
