//! Presentation and audio seams
//!
//! The core never draws or plays anything itself. It tells a `Stage` where
//! each word is and which transient effects to show, and asks an `AudioOut`
//! to play cues. Both may fail; the session logs and moves on.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// Average glyph advance relative to font size
const GLYPH_ADVANCE: f32 = 0.6;
/// Line box height relative to font size
const LINE_HEIGHT: f32 = 1.2;

/// Rough single-line text box, for hosts that cannot measure and for layout
/// the core plans before anything is presented
pub fn estimate_text_size(text: &str, font_px: f32) -> Vec2 {
    let chars = text.chars().count().max(1) as f32;
    Vec2::new(chars * font_px * GLYPH_ADVANCE, font_px * LINE_HEIGHT)
}

/// Opaque handle to a presented word element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualId(pub u32);

/// A freshly created word element and its measured box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordVisual {
    pub id: VisualId,
    pub size: Vec2,
}

/// Visual state changes for a word element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WordLook {
    /// Selected and waiting for the user (glow, pointer cursor)
    Armed,
    /// Opacity change, used by the armed blink
    Opacity { value: f32, transition_ms: f64 },
    /// Blink cancelled, color transitions to red
    Igniting { duration_ms: f64 },
    /// Fading out before removal
    FadeOut { duration_ms: f64 },
}

/// Self-expiring decorative elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Expanding ring at the blast center
    Shockwave { center: Vec2, lifetime_ms: f64 },
    /// Dot flying from `origin` by `travel`
    Particle {
        origin: Vec2,
        travel: Vec2,
        size: f32,
        lifetime_ms: f64,
    },
    /// Persistent decorative glyph from the sprinkle
    Glyph { text: String, pos: Vec2, font_px: f32 },
}

/// Post-blast message block, created hidden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBox {
    pub lines: Vec<String>,
    pub font_px: f32,
    pub line_gap_px: f32,
    /// Fade + rise duration per line
    pub fade_ms: f64,
}

/// Presentation surface
pub trait Stage {
    /// Create a word element and measure its rendered box
    fn create_word(&mut self, text: &str, font_px: f32) -> Result<WordVisual, CapabilityError>;
    /// Move a word element to a body transform
    fn place_word(&mut self, id: VisualId, pos: Vec2, angle: f32) -> Result<(), CapabilityError>;
    fn style_word(&mut self, id: VisualId, look: WordLook) -> Result<(), CapabilityError>;
    fn remove_word(&mut self, id: VisualId) -> Result<(), CapabilityError>;
    fn spawn_effect(&mut self, effect: Effect) -> Result<(), CapabilityError>;
    /// Damped camera shake of the whole scene
    fn shake(&mut self, duration_ms: f64, magnitude: f32) -> Result<(), CapabilityError>;
    fn show_messages(&mut self, messages: &MessageBox) -> Result<(), CapabilityError>;
    /// Start the fade + rise of one message line
    fn reveal_line(&mut self, index: usize) -> Result<(), CapabilityError>;
}

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    /// Short pop around the blast
    Pop,
    /// Sustained ambience after the blast
    Music,
}

/// Audio output. Volume and looping are fixed when the output is built.
pub trait AudioOut {
    fn play(&mut self, sound: Sound) -> Result<(), CapabilityError>;
}

/// Borrowed capabilities handed to each session call
pub struct Outputs<'a> {
    pub stage: &'a mut dyn Stage,
    pub audio: &'a mut dyn AudioOut,
}

impl<'a> Outputs<'a> {
    pub fn new(stage: &'a mut dyn Stage, audio: &'a mut dyn AudioOut) -> Self {
        Self { stage, audio }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_scales_with_text() {
        let short = estimate_text_size("love", 50.0);
        let long = estimate_text_size("darling", 50.0);
        assert!(long.x > short.x);
        assert_eq!(short.y, long.y);
        assert_eq!(short, Vec2::new(120.0, 60.0));
    }

    #[test]
    fn test_estimate_never_zero_width() {
        assert_eq!(estimate_text_size("", 10.0), Vec2::new(6.0, 12.0));
    }
}
