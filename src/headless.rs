//! In-memory presentation and audio surfaces
//!
//! Used by the native runner, by the wasm export (which drains the queued
//! commands to JS) and by tests. Text is measured with a caller-supplied
//! function, falling back to a fixed-advance estimate.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::Serialize;

use crate::error::CapabilityError;
use crate::surface::{
    AudioOut, Effect, MessageBox, Sound, Stage, VisualId, WordLook, WordVisual, estimate_text_size,
};

/// Everything a stage was asked to do, except per-tick placement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StageCommand {
    CreateWord { id: VisualId, text: String, font_px: f32 },
    StyleWord { id: VisualId, look: WordLook },
    RemoveWord { id: VisualId },
    Effect { effect: Effect },
    Shake { duration_ms: f64, magnitude: f32 },
    ShowMessages { messages: MessageBox },
    RevealLine { index: usize },
}

/// Latest transform of a word element
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub id: VisualId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

type MeasureFn = Box<dyn Fn(&str, f32) -> Vec2>;

/// Recording stage
pub struct HeadlessStage {
    measure: MeasureFn,
    next_id: u32,
    live: BTreeSet<VisualId>,
    placements: BTreeMap<VisualId, Placement>,
    commands: Vec<StageCommand>,
    /// Make `create_word` fail (tests)
    pub fail_create: bool,
    /// Make every effect, shake and message call fail (tests)
    pub fail_effects: bool,
}

impl Default for HeadlessStage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessStage {
    pub fn new() -> Self {
        Self::with_measure(Box::new(estimate_text_size))
    }

    pub fn with_measure(measure: MeasureFn) -> Self {
        Self {
            measure,
            next_id: 1,
            live: BTreeSet::new(),
            placements: BTreeMap::new(),
            commands: Vec::new(),
            fail_create: false,
            fail_effects: false,
        }
    }

    /// Word elements currently on stage
    pub fn live_words(&self) -> &BTreeSet<VisualId> {
        &self.live
    }

    pub fn placement(&self, id: VisualId) -> Option<Placement> {
        self.placements.get(&id).copied()
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.placements.values()
    }

    pub fn commands(&self) -> &[StageCommand] {
        &self.commands
    }

    /// Hand over queued commands (oldest first)
    pub fn drain_commands(&mut self) -> Vec<StageCommand> {
        std::mem::take(&mut self.commands)
    }

    fn effects_guard(&self) -> Result<(), CapabilityError> {
        if self.fail_effects {
            Err(CapabilityError::presentation("effects unavailable"))
        } else {
            Ok(())
        }
    }
}

impl Stage for HeadlessStage {
    fn create_word(&mut self, text: &str, font_px: f32) -> Result<WordVisual, CapabilityError> {
        if self.fail_create {
            return Err(CapabilityError::presentation("cannot create word element"));
        }
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.commands.push(StageCommand::CreateWord {
            id,
            text: text.to_string(),
            font_px,
        });
        Ok(WordVisual {
            id,
            size: (self.measure)(text, font_px),
        })
    }

    fn place_word(&mut self, id: VisualId, pos: Vec2, angle: f32) -> Result<(), CapabilityError> {
        if !self.live.contains(&id) {
            return Err(CapabilityError::presentation(format!("no element {}", id.0)));
        }
        self.placements.insert(
            id,
            Placement {
                id,
                x: pos.x,
                y: pos.y,
                angle,
            },
        );
        Ok(())
    }

    fn style_word(&mut self, id: VisualId, look: WordLook) -> Result<(), CapabilityError> {
        if !self.live.contains(&id) {
            return Err(CapabilityError::presentation(format!("no element {}", id.0)));
        }
        self.commands.push(StageCommand::StyleWord { id, look });
        Ok(())
    }

    fn remove_word(&mut self, id: VisualId) -> Result<(), CapabilityError> {
        if !self.live.remove(&id) {
            return Err(CapabilityError::presentation(format!("no element {}", id.0)));
        }
        self.placements.remove(&id);
        self.commands.push(StageCommand::RemoveWord { id });
        Ok(())
    }

    fn spawn_effect(&mut self, effect: Effect) -> Result<(), CapabilityError> {
        self.effects_guard()?;
        self.commands.push(StageCommand::Effect { effect });
        Ok(())
    }

    fn shake(&mut self, duration_ms: f64, magnitude: f32) -> Result<(), CapabilityError> {
        self.effects_guard()?;
        self.commands.push(StageCommand::Shake {
            duration_ms,
            magnitude,
        });
        Ok(())
    }

    fn show_messages(&mut self, messages: &MessageBox) -> Result<(), CapabilityError> {
        self.effects_guard()?;
        self.commands.push(StageCommand::ShowMessages {
            messages: messages.clone(),
        });
        Ok(())
    }

    fn reveal_line(&mut self, index: usize) -> Result<(), CapabilityError> {
        self.effects_guard()?;
        self.commands.push(StageCommand::RevealLine { index });
        Ok(())
    }
}

/// Recording audio output
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    pub played: Vec<Sound>,
    /// Reject every play, like a browser blocking autoplay (tests)
    pub blocked: bool,
}

impl AudioOut for HeadlessAudio {
    fn play(&mut self, sound: Sound) -> Result<(), CapabilityError> {
        if self.blocked {
            return Err(CapabilityError::audio("playback blocked"));
        }
        self.played.push(sound);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_forgets_placement() {
        let mut stage = HeadlessStage::new();
        let word = stage.create_word("mine", 30.0).unwrap();
        stage.place_word(word.id, Vec2::new(1.0, 2.0), 0.5).unwrap();
        assert!(stage.placement(word.id).is_some());

        stage.remove_word(word.id).unwrap();
        assert!(stage.placement(word.id).is_none());
        assert!(stage.place_word(word.id, Vec2::ZERO, 0.0).is_err());
        assert!(stage.remove_word(word.id).is_err());
    }

    #[test]
    fn test_custom_measure() {
        let mut stage = HeadlessStage::with_measure(Box::new(|_, _| Vec2::new(10.0, 5.0)));
        let word = stage.create_word("anything", 99.0).unwrap();
        assert_eq!(word.size, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn test_blocked_audio_errors() {
        let mut audio = HeadlessAudio {
            blocked: true,
            ..Default::default()
        };
        assert!(audio.play(Sound::Pop).is_err());
        assert!(audio.played.is_empty());
    }
}
