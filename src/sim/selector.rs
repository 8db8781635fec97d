//! Chosen-word selection and arming
//!
//! After spawning ends, exactly one word is picked: the one nearest the center
//! sensor among those touching it, else the nearest to center overall. The
//! nearest-overall fallback can pick a word outside the visible area when the
//! pile never reaches the center; that is accepted behavior.

use std::sync::Arc;

use super::physics::{BodyHandle, Physics};
use super::sync::LiveWords;
use super::timeline::TimerId;
use super::world::World;
use crate::config::Config;
use crate::consts::BLINK_DIM_OPACITY;
use crate::error::soft;
use crate::surface::{Stage, VisualId, WordLook};

/// Pick the word to detonate, or `None` when there are no words
pub fn pick_chosen<P: Physics>(world: &World<P>) -> Option<BodyHandle> {
    let center = world.sensor_center();
    let touching = world.query_overlap(world.sensor());
    if touching.is_empty() {
        return world.query_near(center).first().copied();
    }

    let mut best: Option<(f32, BodyHandle)> = None;
    for handle in touching {
        let Some(body) = world.body(handle) else {
            continue;
        };
        let d2 = body.position.distance_squared(center);
        // Strictly closer only: ties keep the first found
        if best.is_none_or(|(best_d2, _)| d2 < best_d2) {
            best = Some((d2, handle));
        }
    }
    best.map(|(_, h)| h)
}

/// The chosen word and its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chosen {
    pub body: BodyHandle,
    pub visual: VisualId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub chosen: Option<Chosen>,
    /// Selection logic has run (it never runs twice)
    pub finalized: bool,
    /// Blink timer while armed
    pub blink: Option<TimerId>,
    blink_visible: bool,
    /// The user hook fired
    pub activated: bool,
}

pub struct Selector {
    config: Arc<Config>,
    state: SelectionState,
}

impl Selector {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            state: SelectionState::default(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn chosen(&self) -> Option<Chosen> {
        self.state.chosen
    }

    /// Run selection once. Returns the chosen pair, if any word had a live element.
    pub fn finalize<P: Physics>(&mut self, world: &World<P>, live: &LiveWords) -> Option<Chosen> {
        if self.state.finalized {
            return None;
        }
        self.state.finalized = true;

        let body = pick_chosen(world)?;
        let visual = live.visual_of(body)?;
        let chosen = Chosen { body, visual };
        self.state.chosen = Some(chosen);
        log::info!("Chosen word body {} (element {})", body.0, visual.0);
        Some(chosen)
    }

    /// Put the chosen element into its armed look
    pub fn arm(&mut self, stage: &mut dyn Stage, blink: TimerId) {
        let Some(chosen) = self.state.chosen else {
            return;
        };
        self.state.blink = Some(blink);
        self.state.blink_visible = true;
        soft("arm chosen word", stage.style_word(chosen.visual, WordLook::Armed));
    }

    /// One blink step. Returns false when the chosen word is gone and the blink should stop.
    pub fn blink(&mut self, live: &LiveWords, stage: &mut dyn Stage) -> bool {
        let Some(chosen) = self.state.chosen else {
            return false;
        };
        if !live.contains(chosen.body) {
            return false;
        }
        self.state.blink_visible = !self.state.blink_visible;
        let value = if self.state.blink_visible {
            1.0
        } else {
            BLINK_DIM_OPACITY
        };
        soft(
            "blink chosen word",
            stage.style_word(
                chosen.visual,
                WordLook::Opacity {
                    value,
                    transition_ms: self.config.blink_period_ms(),
                },
            ),
        );
        true
    }

    /// User hit the armed word. Returns the blink timer to cancel, first time only.
    pub fn activate(&mut self, stage: &mut dyn Stage) -> Option<Option<TimerId>> {
        let chosen = self.state.chosen?;
        if self.state.activated {
            return None;
        }
        self.state.activated = true;
        let blink = self.state.blink.take();
        soft(
            "restore chosen opacity",
            stage.style_word(
                chosen.visual,
                WordLook::Opacity {
                    value: 1.0,
                    transition_ms: 0.0,
                },
            ),
        );
        soft(
            "ignite chosen word",
            stage.style_word(
                chosen.visual,
                WordLook::Igniting {
                    duration_ms: self.config.red_transition_ms,
                },
            ),
        );
        Some(blink)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::config::Viewport;
    use crate::headless::{HeadlessStage, StageCommand};
    use crate::sim::rapier::RapierPhysics;
    use crate::sim::physics::{BodyDesc, BodyLabel};
    use crate::sim::timeline::TimerId;

    struct Scene {
        world: World<RapierPhysics>,
        live: LiveWords,
        stage: HeadlessStage,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                world: World::new(RapierPhysics::new(), Viewport::new(800.0, 600.0), 0.5),
                live: LiveWords::new(),
                stage: HeadlessStage::new(),
            }
        }

        fn word(&mut self, pos: Vec2) -> BodyHandle {
            let visual = self.stage.create_word("love", 20.0).unwrap();
            let body = self.world.add_body(BodyDesc::dynamic(
                BodyLabel::Word,
                pos,
                Vec2::new(80.0, 30.0),
            ));
            self.live.insert(body, visual.id);
            body
        }
    }

    #[test]
    fn test_prefers_sensor_overlap() {
        let mut scene = Scene::new();
        let _far = scene.word(Vec2::new(100.0, 100.0));
        let touching_far = scene.word(Vec2::new(430.0, 300.0));
        let touching_near = scene.word(Vec2::new(395.0, 305.0));
        assert_eq!(pick_chosen(&scene.world), Some(touching_near));
        assert_ne!(pick_chosen(&scene.world), Some(touching_far));
    }

    #[test]
    fn test_touching_ties_keep_first_found() {
        let mut scene = Scene::new();
        let first = scene.word(Vec2::new(410.0, 300.0));
        let _second = scene.word(Vec2::new(390.0, 300.0));
        assert_eq!(pick_chosen(&scene.world), Some(first));
    }

    #[test]
    fn test_falls_back_to_nearest() {
        let mut scene = Scene::new();
        let _far = scene.word(Vec2::new(100.0, 100.0));
        let near = scene.word(Vec2::new(400.0, 500.0));
        assert!(scene.world.query_overlap(scene.world.sensor()).is_empty());
        assert_eq!(pick_chosen(&scene.world), Some(near));
    }

    #[test]
    fn test_no_words_no_choice() {
        let scene = Scene::new();
        assert_eq!(pick_chosen(&scene.world), None);
        let mut selector = Selector::new(Arc::new(Config::default()));
        assert!(selector.finalize(&scene.world, &scene.live).is_none());
        assert!(selector.state().finalized);
        assert!(selector.activate(&mut HeadlessStage::new()).is_none());
    }

    #[test]
    fn test_finalize_runs_once() {
        let mut scene = Scene::new();
        let body = scene.word(Vec2::new(400.0, 300.0));
        let mut selector = Selector::new(Arc::new(Config::default()));
        assert_eq!(selector.finalize(&scene.world, &scene.live).map(|c| c.body), Some(body));
        assert!(selector.finalize(&scene.world, &scene.live).is_none());
        assert_eq!(selector.chosen().map(|c| c.body), Some(body));
    }

    #[test]
    fn test_blink_alternates_and_activation_once() {
        let mut scene = Scene::new();
        scene.word(Vec2::new(400.0, 300.0));
        let mut selector = Selector::new(Arc::new(Config::default()));
        selector.finalize(&scene.world, &scene.live);
        selector.arm(&mut scene.stage, TimerId(5));

        assert!(selector.blink(&scene.live, &mut scene.stage));
        assert!(selector.blink(&scene.live, &mut scene.stage));
        let opacities: Vec<f32> = scene
            .stage
            .commands()
            .iter()
            .filter_map(|c| match c {
                StageCommand::StyleWord {
                    look: WordLook::Opacity { value, .. },
                    ..
                } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(opacities, vec![BLINK_DIM_OPACITY, 1.0]);

        assert_eq!(selector.activate(&mut scene.stage), Some(Some(TimerId(5))));
        assert_eq!(selector.activate(&mut scene.stage), None);
        assert!(matches!(
            scene.stage.commands().last(),
            Some(StageCommand::StyleWord {
                look: WordLook::Igniting { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_blink_stops_for_stale_word() {
        let mut scene = Scene::new();
        let body = scene.word(Vec2::new(400.0, 300.0));
        let mut selector = Selector::new(Arc::new(Config::default()));
        selector.finalize(&scene.world, &scene.live);
        scene.live.remove(body);
        assert!(!selector.blink(&scene.live, &mut scene.stage));
    }
}
