//! Post-blast choreography
//!
//! Pure scheduling: given the detonation time, works out when the music
//! starts, when each message line reveals and, once the last line is on its
//! way, where and when the decorative glyphs land. No physics involved.

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::physics::Aabb;
use crate::config::{Config, SprinkleConfig, Viewport};
use crate::surface::{Effect, MessageBox, estimate_text_size};

/// A downstream cue anchored to the detonation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Music,
    /// Create the (hidden) message block
    ShowMessages,
    /// Start revealing line `i`
    RevealLine(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedCue {
    pub at_ms: f64,
    pub cue: Cue,
}

/// One decorative glyph and when it appears
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphDrop {
    pub at_ms: f64,
    pub effect: Effect,
}

pub struct Choreographer {
    config: Arc<Config>,
}

impl Choreographer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn message_box(&self) -> MessageBox {
        MessageBox {
            lines: self.config.message_lines(),
            font_px: self.config.message_font_px(),
            line_gap_px: self.config.post_message_line_gap_px,
            fade_ms: self.config.post_message_fade_ms,
        }
    }

    pub fn line_count(&self) -> usize {
        self.config.message_lines().len()
    }

    /// Cues for a detonation at `anchor_ms`, in firing order
    pub fn after_blast(&self, anchor_ms: f64) -> Vec<TimedCue> {
        let cfg = &self.config;
        let messages_at = anchor_ms + cfg.post_message_delay_ms;
        let mut cues = vec![
            TimedCue {
                at_ms: anchor_ms + cfg.sound_music_delay_ms,
                cue: Cue::Music,
            },
            TimedCue {
                at_ms: messages_at,
                cue: Cue::ShowMessages,
            },
        ];
        cues.extend((0..self.line_count()).map(|i| TimedCue {
            at_ms: messages_at + i as f64 * cfg.post_message_stagger_ms.max(0.0),
            cue: Cue::RevealLine(i),
        }));
        cues.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        cues
    }

    /// Glyph drops starting at `start_ms` (when the last line begins revealing)
    pub fn sprinkle(&self, viewport: &Viewport, start_ms: f64) -> Vec<GlyphDrop> {
        let Some(sprinkle) = &self.config.sprinkle else {
            return Vec::new();
        };
        if sprinkle.glyphs.is_empty() {
            return Vec::new();
        }
        let exclusion = message_bounds(&self.message_box(), viewport);
        let points = sprinkle_points(sprinkle, viewport, &exclusion);

        let mut at = start_ms;
        let mut gap = sprinkle.step_ms.max(0.0);
        points
            .into_iter()
            .enumerate()
            .map(|(k, pos)| {
                at += gap;
                gap += sprinkle.slowdown_ms.max(0.0);
                GlyphDrop {
                    at_ms: at,
                    effect: Effect::Glyph {
                        text: sprinkle.glyphs[k % sprinkle.glyphs.len()].clone(),
                        pos,
                        font_px: sprinkle.font_size_px,
                    },
                }
            })
            .collect()
    }
}

/// Estimated bounds of the message block, centered in the viewport
pub fn message_bounds(messages: &MessageBox, viewport: &Viewport) -> Aabb {
    let width = messages
        .lines
        .iter()
        .map(|line| estimate_text_size(line, messages.font_px).x)
        .fold(0.0, f32::max);
    let rows = messages.lines.len() as f32;
    let line_h = estimate_text_size("", messages.font_px).y;
    let height = rows * line_h + (rows - 1.0).max(0.0) * messages.line_gap_px;
    Aabb::from_center(viewport.center(), Vec2::new(width, height) / 2.0)
}

/// Grid intersections inside the viewport, minus the padded exclusion box,
/// shuffled once and cut to the configured maximum
pub fn sprinkle_points(sprinkle: &SprinkleConfig, viewport: &Viewport, exclusion: &Aabb) -> Vec<Vec2> {
    let step = sprinkle.grid_step_px;
    if step <= 0.0 {
        return Vec::new();
    }
    let pad = Vec2::splat(sprinkle.exclusion_pad_px);
    let keep_out = Aabb {
        min: exclusion.min - pad,
        max: exclusion.max + pad,
    };

    let cols = (viewport.width / step).ceil() as u32;
    let rows = (viewport.height / step).ceil() as u32;
    let mut points = Vec::new();
    for j in 1..rows {
        for i in 1..cols {
            let p = Vec2::new(i as f32 * step, j as f32 * step);
            if p.x >= viewport.width || p.y >= viewport.height {
                continue;
            }
            if keep_out.overlaps(&Aabb::from_center(p, Vec2::ZERO)) {
                continue;
            }
            points.push(p);
        }
    }

    let mut rng = Pcg32::seed_from_u64(sprinkle.shuffle_seed);
    points.shuffle(&mut rng);
    points.truncate(sprinkle.max_count);
    points
}
