//! Word spawner
//!
//! Drops one word at a time from a cyclic text list, sized to the measured
//! text box, above the viewport at a random offset and tilt. Enforces the
//! total spawn limit and evicts the oldest live words beyond the cap.

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::physics::{BodyDesc, BodyLabel, Physics};
use super::sync::{LiveWords, destroy_word};
use super::timeline::TimerId;
use super::world::World;
use crate::config::{Config, Viewport};
use crate::deg_to_rad;
use crate::surface::Stage;

/// Spawn counters. Only ever move forward within a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnState {
    /// Words emitted so far (including ones whose element failed to appear)
    pub spawned: u32,
    /// Position in the text cycle
    pub text_index: usize,
    /// The recurring driver, while it runs
    pub driver: Option<TimerId>,
}

/// Where and how a new word enters the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub angle: f32,
}

pub struct Spawner {
    config: Arc<Config>,
    state: SpawnState,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(config: Arc<Config>, seed: u64) -> Self {
        Self {
            config,
            state: SpawnState::default(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &SpawnState {
        &self.state
    }

    pub fn set_driver(&mut self, driver: TimerId) {
        self.state.driver = Some(driver);
    }

    /// Hand back the driver so it can be cancelled; `None` once it already was
    pub fn take_driver(&mut self) -> Option<TimerId> {
        self.state.driver.take()
    }

    pub fn can_spawn_more(&self) -> bool {
        if self.config.words.is_empty() {
            return false;
        }
        match self.config.spawn_limit {
            Some(limit) => self.state.spawned < limit,
            None => true,
        }
    }

    /// Spawning has run out for good (never true for unlimited spawning)
    pub fn is_exhausted(&self) -> bool {
        self.config.spawn_is_bounded() && !self.can_spawn_more()
    }

    fn next_text(&mut self) -> String {
        let words = &self.config.words;
        let text = words[self.state.text_index % words.len()].clone();
        self.state.text_index = (self.state.text_index + 1) % words.len();
        text
    }

    /// Random drop point and tilt for a word of `size`
    pub fn placement(&mut self, size: Vec2, viewport: &Viewport) -> Placement {
        let cfg = &self.config;
        let width = viewport.width;
        let spread = width * cfg.spawn_horizontal_spread;
        let mut x = width / 2.0 + (self.rng.random::<f32>() - 0.5) * spread;
        let y = -(cfg.spawn_height_min + self.rng.random::<f32>() * cfg.spawn_height_rand);
        let angle_deg = cfg.rotation_min_deg
            + self.rng.random::<f32>() * (cfg.rotation_max_deg - cfg.rotation_min_deg);

        // Keep the whole box on screen horizontally when it fits
        let min_x = size.x / 2.0 + cfg.spawn_margin_px;
        let max_x = width - size.x / 2.0 - cfg.spawn_margin_px;
        if max_x > min_x {
            x = x.clamp(min_x, max_x);
        }

        Placement {
            position: Vec2::new(x, y),
            angle: deg_to_rad(angle_deg),
        }
    }

    /// Create one word body + element. False once the limit is reached.
    pub fn spawn_one<P: Physics>(
        &mut self,
        world: &mut World<P>,
        live: &mut LiveWords,
        stage: &mut dyn Stage,
    ) -> bool {
        if !self.can_spawn_more() {
            return false;
        }
        let text = self.next_text();
        self.state.spawned += 1;

        let visual = match stage.create_word(&text, self.config.font_size_px) {
            Ok(visual) => visual,
            Err(e) => {
                log::warn!("Word '{text}' skipped: {e}");
                return true;
            }
        };
        let size = Vec2::new(
            visual.size.x.max(self.config.min_word_width),
            visual.size.y.max(self.config.min_word_height),
        );
        let viewport = *world.viewport();
        let placement = self.placement(size, &viewport);
        let body = world.add_body(
            BodyDesc::dynamic(BodyLabel::Word, placement.position, size).with_angle(placement.angle),
        );
        live.insert(body, visual.id);
        log::debug!(
            "Spawned '{text}' #{} at ({:.0}, {:.0})",
            self.state.spawned,
            placement.position.x,
            placement.position.y
        );
        true
    }

    /// Remove the oldest words until the live count fits the cap. Returns how many went.
    pub fn evict_overflow<P: Physics>(
        &self,
        world: &mut World<P>,
        live: &mut LiveWords,
        stage: &mut dyn Stage,
    ) -> usize {
        let doomed = live.overflow(self.config.max_words);
        let mut evicted = 0;
        for body in doomed {
            if destroy_word(world, live, stage, body) {
                evicted += 1;
            }
        }
        if evicted > 0 {
            log::debug!("Evicted {evicted} oldest words (cap {})", self.config.max_words);
        }
        evicted
    }
}
