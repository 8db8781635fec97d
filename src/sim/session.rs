//! Session state machine
//!
//! Owns the world, the live word map, the timer queue and every component,
//! and advances them on a fixed timestep. Phases only move forward:
//!
//! ```text
//! Idle -> Spawning -> AwaitingSelection -> Armed -> Detonating -> PostSequence
//!                                       \-> NoCandidate
//! ```
//!
//! One-shot steps (selection, detonation, boundary removal) cannot run twice
//! because the phase they require is left as soon as they start.

use std::sync::Arc;

use serde::Serialize;

use super::blast::Blast;
use super::choreo::{Choreographer, Cue};
use super::physics::{BodyHandle, Physics};
use super::selector::Selector;
use super::spawner::Spawner;
use super::sync::{LiveWords, destroy_word, emit};
use super::timeline::{Timeline, TimerId};
use super::world::World;
use crate::config::{Config, Viewport};
use crate::consts::*;
use crate::error::soft;
use crate::surface::{Effect, Outputs, Sound, WordLook};

/// Where the session is in its one-way life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not started
    Idle,
    /// Words are dropping
    Spawning,
    /// Spawning is over; selection runs after the settle delay
    AwaitingSelection,
    /// A word is chosen and blinking, waiting for the user
    Armed,
    /// The user hit the word; it is turning red
    Detonating,
    /// Blast done, downstream cues playing out
    PostSequence,
    /// Nothing to choose (or the chosen word vanished); terminal
    NoCandidate,
}

/// Scheduled work
#[derive(Debug, Clone, PartialEq)]
enum Task {
    SpawnTick,
    Select,
    Blink,
    PopCue,
    Detonate,
    RemoveChosen,
    Cue(Cue),
    Glyph(Effect),
    ApplyResize(Viewport),
}

/// Snapshot for logs and hosts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub phase: Phase,
    pub elapsed_ms: f64,
    pub spawned: u32,
    pub live_words: usize,
    pub chosen: Option<BodyHandle>,
    pub boundaries_removed: bool,
    pub detonated_at_ms: Option<f64>,
}

pub struct Session<P: Physics> {
    config: Arc<Config>,
    world: World<P>,
    live: LiveWords,
    timeline: Timeline<Task>,
    spawner: Spawner,
    selector: Selector,
    blast: Blast,
    choreo: Choreographer,
    phase: Phase,
    /// Session clock, advanced only by fixed steps
    now_ms: f64,
    accumulator: f64,
    pop_played: bool,
    pending_resize: Option<TimerId>,
    detonated_at_ms: Option<f64>,
}

impl<P: Physics> Session<P> {
    pub fn new(config: Config, viewport: Viewport, physics: P, seed: u64) -> Self {
        let config = Arc::new(config);
        let world = World::new(physics, viewport, config.gravity);
        Self {
            world,
            live: LiveWords::new(),
            timeline: Timeline::new(),
            spawner: Spawner::new(Arc::clone(&config), seed),
            selector: Selector::new(Arc::clone(&config)),
            blast: Blast::new(Arc::clone(&config), seed.wrapping_add(0x9E37_79B9)),
            choreo: Choreographer::new(Arc::clone(&config)),
            config,
            phase: Phase::Idle,
            now_ms: 0.0,
            accumulator: 0.0,
            pop_played: false,
            pending_resize: None,
            detonated_at_ms: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn world(&self) -> &World<P> {
        &self.world
    }

    pub fn live_words(&self) -> &LiveWords {
        &self.live
    }

    pub fn chosen(&self) -> Option<BodyHandle> {
        self.selector.chosen().map(|c| c.body)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            phase: self.phase,
            elapsed_ms: self.now_ms,
            spawned: self.spawner.state().spawned,
            live_words: self.live.len(),
            chosen: self.chosen(),
            boundaries_removed: self.world.boundaries_removed(),
            detonated_at_ms: self.detonated_at_ms,
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?} at {:.0}ms", self.phase, phase, self.now_ms);
            self.phase = phase;
        }
    }

    /// Begin dropping words. Ignored unless idle.
    pub fn start(&mut self, out: &mut Outputs<'_>) {
        if self.phase != Phase::Idle {
            return;
        }
        self.enter(Phase::Spawning);

        for _ in 0..self.config.initial_burst {
            if !self.spawner.spawn_one(&mut self.world, &mut self.live, out.stage) {
                break;
            }
        }
        self.spawner
            .evict_overflow(&mut self.world, &mut self.live, out.stage);

        if self.spawner.is_exhausted() {
            self.schedule_selection();
        } else if self.spawner.can_spawn_more() {
            let every = self.config.spawn_every_ms;
            let driver = self.timeline.every(self.now_ms + every, every, Task::SpawnTick);
            self.spawner.set_driver(driver);
        } else {
            log::warn!("No words configured; nothing will spawn");
        }
        emit(&self.world, &self.live, out.stage);
    }

    fn schedule_selection(&mut self) {
        self.enter(Phase::AwaitingSelection);
        self.timeline
            .once(self.now_ms + self.config.selection_delay_ms, Task::Select);
    }

    /// The user hit the armed word. Returns true if that started the detonation.
    pub fn activate(&mut self, out: &mut Outputs<'_>) -> bool {
        if self.phase != Phase::Armed {
            log::debug!("Activation ignored in phase {:?}", self.phase);
            return false;
        }
        let Some(chosen) = self.selector.chosen() else {
            return false;
        };
        if !self.live.contains(chosen.body) {
            log::warn!("Chosen word is gone; nothing to detonate");
            self.enter(Phase::NoCandidate);
            return false;
        }
        let Some(blink) = self.selector.activate(out.stage) else {
            return false;
        };
        if let Some(blink) = blink {
            self.timeline.cancel(blink);
        }

        self.timeline
            .once(self.now_ms + self.config.pop_pre_delay_ms(), Task::PopCue);
        self.timeline
            .once(self.now_ms + self.config.red_transition_ms, Task::Detonate);
        self.enter(Phase::Detonating);
        true
    }

    /// Note a new viewport. The world follows once resizing has settled.
    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(pending) = self.pending_resize.take() {
            self.timeline.cancel(pending);
        }
        let due = self.now_ms + self.config.resize_debounce_ms;
        self.pending_resize = Some(self.timeline.once(due, Task::ApplyResize(viewport)));
    }

    /// Advance by wall-clock `dt_ms`, running as many fixed steps as fit.
    /// Returns the number of steps taken.
    pub fn update(&mut self, dt_ms: f64, out: &mut Outputs<'_>) -> u32 {
        self.accumulator += dt_ms.clamp(0.0, 100.0);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            self.tick(out);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }
        substeps
    }

    /// One fixed step: due timers, wind, physics, then sync
    pub fn tick(&mut self, out: &mut Outputs<'_>) {
        self.now_ms += SIM_DT_MS;

        while let Some((id, _, task)) = self.timeline.pop_due(self.now_ms) {
            self.run(id, task, out);
        }

        self.blast.apply_wind(&mut self.world, self.now_ms);
        self.world.tick(SIM_DT_MS);
        emit(&self.world, &self.live, out.stage);
    }

    fn run(&mut self, id: TimerId, task: Task, out: &mut Outputs<'_>) {
        match task {
            Task::SpawnTick => self.spawn_tick(out),
            Task::Select => self.select(out),
            Task::Blink => {
                if !self.selector.blink(&self.live, out.stage) {
                    self.timeline.cancel(id);
                }
            }
            Task::PopCue => self.play_pop(out),
            Task::Detonate => self.detonate(out),
            Task::RemoveChosen => {
                if let Some(chosen) = self.selector.chosen()
                    && destroy_word(&mut self.world, &mut self.live, out.stage, chosen.body)
                {
                    log::debug!("Chosen word removed");
                }
            }
            Task::Cue(cue) => self.run_cue(cue, out),
            Task::Glyph(effect) => {
                soft("sprinkle glyph", out.stage.spawn_effect(effect));
            }
            Task::ApplyResize(viewport) => {
                self.pending_resize = None;
                self.world.resize(viewport);
            }
        }
    }

    fn spawn_tick(&mut self, out: &mut Outputs<'_>) {
        if self.phase != Phase::Spawning {
            return;
        }
        if self
            .spawner
            .spawn_one(&mut self.world, &mut self.live, out.stage)
        {
            self.spawner
                .evict_overflow(&mut self.world, &mut self.live, out.stage);
            return;
        }
        // The driver stops on the first tick that has nothing left to spawn
        if let Some(driver) = self.spawner.take_driver() {
            self.timeline.cancel(driver);
        }
        log::info!("Spawning done: {} words", self.spawner.state().spawned);
        self.schedule_selection();
    }

    fn select(&mut self, out: &mut Outputs<'_>) {
        if self.phase != Phase::AwaitingSelection {
            return;
        }
        if self.selector.finalize(&self.world, &self.live).is_none() {
            log::info!("No word to choose");
            self.enter(Phase::NoCandidate);
            return;
        }
        let period = self.config.blink_period_ms();
        let blink = self.timeline.every(self.now_ms + period, period, Task::Blink);
        self.selector.arm(out.stage, blink);
        self.enter(Phase::Armed);
    }

    fn play_pop(&mut self, out: &mut Outputs<'_>) {
        if self.pop_played {
            return;
        }
        if soft("pop sound", out.audio.play(Sound::Pop)).is_some() {
            self.pop_played = true;
        }
    }

    fn detonate(&mut self, out: &mut Outputs<'_>) {
        if self.phase != Phase::Detonating {
            return;
        }
        let Some(chosen) = self.selector.chosen() else {
            return;
        };
        if !self.live.contains(chosen.body) {
            log::warn!("Chosen word vanished before the blast");
            self.enter(Phase::NoCandidate);
            return;
        }
        if self
            .blast
            .trigger(self.now_ms, chosen.body, &mut self.world, out.stage)
            .is_none()
        {
            return;
        }
        self.play_pop(out);
        self.detonated_at_ms = Some(self.now_ms);

        soft(
            "fade chosen word",
            out.stage.style_word(
                chosen.visual,
                WordLook::FadeOut {
                    duration_ms: self.config.chosen_fade_ms,
                },
            ),
        );
        self.timeline
            .once(self.now_ms + self.config.chosen_remove_ms, Task::RemoveChosen);

        for timed in self.choreo.after_blast(self.now_ms) {
            self.timeline.once(timed.at_ms, Task::Cue(timed.cue));
        }
        self.enter(Phase::PostSequence);
    }

    fn run_cue(&mut self, cue: Cue, out: &mut Outputs<'_>) {
        match cue {
            Cue::Music => {
                soft("music", out.audio.play(Sound::Music));
            }
            Cue::ShowMessages => {
                soft("messages", out.stage.show_messages(&self.choreo.message_box()));
            }
            Cue::RevealLine(index) => {
                soft("reveal line", out.stage.reveal_line(index));
                if index + 1 == self.choreo.line_count() {
                    let viewport = *self.world.viewport();
                    for drop in self.choreo.sprinkle(&viewport, self.now_ms) {
                        self.timeline.once(drop.at_ms, Task::Glyph(drop.effect));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SprinkleConfig;
    use crate::headless::{HeadlessAudio, HeadlessStage, StageCommand};
    use crate::sim::physics::Aabb;
    use crate::sim::rapier::RapierPhysics;

    struct Rig {
        session: Session<RapierPhysics>,
        stage: HeadlessStage,
        audio: HeadlessAudio,
    }

    impl Rig {
        fn new(config: Config) -> Self {
            Self::sized(config, Viewport::new(800.0, 600.0))
        }

        fn sized(config: Config, viewport: Viewport) -> Self {
            Self {
                session: Session::new(config, viewport, RapierPhysics::new(), 11),
                stage: HeadlessStage::new(),
                audio: HeadlessAudio::default(),
            }
        }

        fn start(&mut self) {
            let mut out = Outputs::new(&mut self.stage, &mut self.audio);
            self.session.start(&mut out);
        }

        fn activate(&mut self) -> bool {
            let mut out = Outputs::new(&mut self.stage, &mut self.audio);
            self.session.activate(&mut out)
        }

        fn run_ms(&mut self, ms: f64) {
            let steps = (ms / SIM_DT_MS).ceil() as u32;
            for _ in 0..steps {
                let mut out = Outputs::new(&mut self.stage, &mut self.audio);
                self.session.tick(&mut out);
            }
        }

        fn run_until(&mut self, phase: Phase, max_ms: f64) {
            let mut waited = 0.0;
            while self.session.phase() != phase && waited < max_ms {
                self.run_ms(SIM_DT_MS);
                waited += SIM_DT_MS;
            }
            assert_eq!(self.session.phase(), phase);
        }

        fn count(&self, pred: impl Fn(&StageCommand) -> bool) -> usize {
            self.stage.commands().iter().filter(|c| pred(c)).count()
        }
    }

    fn small() -> Config {
        Config {
            spawn_limit: Some(3),
            max_words: 3,
            post_message_delay_ms: 200.0,
            post_message_stagger_ms: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_three_words_then_armed() {
        let mut rig = Rig::new(small());
        rig.start();
        assert_eq!(rig.session.phase(), Phase::Spawning);
        assert_eq!(rig.session.live_words().len(), 1);

        rig.run_until(Phase::AwaitingSelection, 1000.0);
        assert_eq!(rig.session.live_words().len(), 3);
        assert_eq!(rig.session.world().word_handles().len(), 3);

        rig.run_until(Phase::Armed, 1000.0);
        let chosen = rig.session.chosen().unwrap();
        assert!(rig.session.live_words().contains(chosen));
        assert_eq!(
            rig.count(|c| matches!(c, StageCommand::StyleWord { look: WordLook::Armed, .. })),
            1
        );

        // Nothing more spawns while armed
        rig.run_ms(1000.0);
        assert_eq!(rig.session.summary().spawned, 3);
    }

    #[test]
    fn test_no_words_means_no_candidate() {
        let mut rig = Rig::new(Config {
            words: Vec::new(),
            ..small()
        });
        rig.start();
        rig.run_until(Phase::NoCandidate, 2000.0);
        assert!(rig.session.chosen().is_none());
        assert!(!rig.activate());
        rig.run_ms(2000.0);
        assert!(!rig.session.world().boundaries_removed());
        assert_eq!(rig.count(|c| matches!(c, StageCommand::Effect { .. })), 0);
    }

    #[test]
    fn test_burst_reaching_limit_skips_driver() {
        let mut rig = Rig::new(Config {
            initial_burst: 5,
            spawn_limit: Some(2),
            ..small()
        });
        rig.start();
        assert_eq!(rig.session.phase(), Phase::AwaitingSelection);
        assert_eq!(rig.session.live_words().len(), 2);
        rig.run_until(Phase::Armed, 1000.0);
    }

    #[test]
    fn test_driver_stops_one_interval_after_last_spawn() {
        let mut rig = Rig::new(small());
        rig.start();
        rig.run_ms(320.0);
        assert_eq!(rig.session.summary().spawned, 3);
        assert_eq!(rig.session.phase(), Phase::Spawning);

        rig.run_until(Phase::AwaitingSelection, 1000.0);
        let stopped_at = rig.session.now_ms();
        assert!((440.0..480.0).contains(&stopped_at), "stopped at {stopped_at}");

        rig.run_until(Phase::Armed, 1000.0);
        assert!(rig.session.now_ms() >= stopped_at + 600.0 - SIM_DT_MS);
    }

    #[test]
    fn test_initial_burst_respects_cap() {
        let mut rig = Rig::new(Config {
            initial_burst: 5,
            spawn_limit: Some(5),
            max_words: 2,
            ..small()
        });
        rig.start();
        assert_eq!(rig.session.summary().spawned, 5);
        assert_eq!(rig.session.live_words().len(), 2);
        assert_eq!(rig.session.world().word_handles().len(), 2);
        assert_eq!(rig.stage.live_words().len(), 2);
    }

    #[test]
    fn test_default_pile_stays_inside_and_settles() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let mut rig = Rig::sized(Config::default(), viewport);
        rig.start();
        rig.run_until(Phase::Armed, 30_000.0);
        assert_eq!(rig.session.live_words().len(), 130);
        rig.run_ms(15_000.0);

        let ground_top = viewport.height + GROUND_DROP - GROUND_HEIGHT / 2.0;
        let world = rig.session.world();
        let mut asleep = 0;
        for handle in world.word_handles() {
            let body = world.body(handle).unwrap();
            let bounds = Aabb::of_rotated(body.position, body.size, body.angle);
            assert!(bounds.min.x >= -3.0, "word {handle:?} left through the wall: {bounds:?}");
            assert!(
                bounds.max.x <= viewport.width + 3.0,
                "word {handle:?} right through the wall: {bounds:?}"
            );
            assert!(
                bounds.max.y <= ground_top + 3.0,
                "word {handle:?} sank through the ground: {bounds:?}"
            );
            if body.sleeping {
                asleep += 1;
            }
        }
        assert!(asleep * 2 > 130, "only {asleep} of 130 words asleep");
        assert_eq!(rig.session.phase(), Phase::Armed);
    }

    #[test]
    fn test_activation_before_armed_is_ignored() {
        let mut rig = Rig::new(small());
        assert!(!rig.activate());
        rig.start();
        assert!(!rig.activate());
        assert_eq!(rig.session.phase(), Phase::Spawning);
    }

    #[test]
    fn test_single_detonation() {
        let mut rig = Rig::new(small());
        rig.start();
        rig.run_until(Phase::Armed, 2000.0);
        assert!(rig.activate());
        assert!(!rig.activate());
        assert_eq!(rig.session.phase(), Phase::Detonating);

        rig.run_until(Phase::PostSequence, 2000.0);
        assert!(!rig.activate());
        rig.run_ms(1000.0);

        let shockwaves = rig.count(|c| {
            matches!(
                c,
                StageCommand::Effect {
                    effect: Effect::Shockwave { .. }
                }
            )
        });
        assert_eq!(shockwaves, 1);
        assert!(rig.session.world().boundaries_removed());
        assert_eq!(rig.audio.played.iter().filter(|s| **s == Sound::Pop).count(), 1);
    }

    #[test]
    fn test_chosen_fades_then_goes() {
        let mut rig = Rig::new(small());
        rig.start();
        rig.run_until(Phase::Armed, 2000.0);
        let chosen = rig.session.chosen().unwrap();
        let visual = rig.session.live_words().visual_of(chosen).unwrap();
        rig.activate();
        rig.run_until(Phase::PostSequence, 2000.0);

        assert!(rig.session.live_words().contains(chosen));
        rig.run_ms(400.0);
        assert!(!rig.session.live_words().contains(chosen));
        assert!(!rig.session.world().contains(chosen));
        assert!(!rig.stage.live_words().contains(&visual));
        assert_eq!(rig.session.live_words().len(), 2);
    }

    #[test]
    fn test_blink_stops_on_activation() {
        let mut rig = Rig::new(Config {
            red_transition_ms: 200.0,
            ..small()
        });
        rig.start();
        rig.run_until(Phase::Armed, 2000.0);
        rig.run_ms(1000.0);
        let is_blink = |c: &StageCommand| {
            matches!(
                c,
                StageCommand::StyleWord {
                    look: WordLook::Opacity { transition_ms, .. },
                    ..
                } if *transition_ms > 0.0
            )
        };
        let blinks = rig.count(is_blink);
        assert!(blinks >= 4);

        rig.activate();
        rig.run_ms(2000.0);
        assert_eq!(rig.count(is_blink), blinks);
    }

    #[test]
    fn test_messages_in_order() {
        let mut rig = Rig::new(small());
        rig.start();
        rig.run_until(Phase::Armed, 2000.0);
        rig.activate();
        rig.run_until(Phase::PostSequence, 2000.0);
        let detonated = rig.session.summary().detonated_at_ms.unwrap();

        rig.run_ms(150.0);
        assert_eq!(rig.count(|c| matches!(c, StageCommand::ShowMessages { .. })), 0);

        rig.run_ms(500.0);
        let order: Vec<Option<usize>> = rig
            .stage
            .commands()
            .iter()
            .filter_map(|c| match c {
                StageCommand::ShowMessages { .. } => Some(None),
                StageCommand::RevealLine { index } => Some(Some(*index)),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec![None, Some(0), Some(1), Some(2)]);
        assert!(rig.session.now_ms() >= detonated + 400.0);
        assert_eq!(rig.audio.played.last(), Some(&Sound::Music));
    }

    #[test]
    fn test_sprinkle_after_last_line() {
        let mut rig = Rig::new(Config {
            sprinkle: Some(SprinkleConfig {
                max_count: 3,
                step_ms: 50.0,
                ..Default::default()
            }),
            ..small()
        });
        rig.start();
        rig.run_until(Phase::Armed, 2000.0);
        rig.activate();
        rig.run_until(Phase::PostSequence, 2000.0);
        rig.run_ms(1000.0);

        let commands = rig.stage.commands();
        let last_line = commands
            .iter()
            .position(|c| matches!(c, StageCommand::RevealLine { index: 2 }))
            .unwrap();
        let glyphs: Vec<usize> = commands
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                matches!(
                    c,
                    StageCommand::Effect {
                        effect: Effect::Glyph { .. }
                    }
                )
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(glyphs.len(), 3);
        assert!(glyphs.iter().all(|i| *i > last_line));
    }

    #[test]
    fn test_resize_after_blast_keeps_boundaries_gone() {
        let mut rig = Rig::new(small());
        rig.start();
        rig.run_until(Phase::Armed, 2000.0);
        rig.activate();
        rig.run_until(Phase::PostSequence, 2000.0);

        rig.session.resize(Viewport::new(1024.0, 768.0));
        rig.run_ms(300.0);
        assert!(rig.session.world().boundary_handles().is_empty());
        assert_eq!(
            rig.session.world().sensor_center(),
            glam::Vec2::new(512.0, 384.0)
        );
    }

    #[test]
    fn test_resize_is_debounced() {
        let mut rig = Rig::new(small());
        rig.start();
        let before = rig.session.world().boundary_handles();
        rig.session.resize(Viewport::new(900.0, 600.0));
        rig.run_ms(100.0);
        rig.session.resize(Viewport::new(1000.0, 600.0));
        rig.run_ms(100.0);
        assert_eq!(rig.session.world().boundary_handles(), before);

        rig.run_ms(100.0);
        assert_eq!(rig.session.world().viewport().width, 1000.0);
        assert_eq!(rig.session.world().boundary_handles().len(), 3);
        assert_ne!(rig.session.world().boundary_handles(), before);
    }

    #[test]
    fn test_capability_failures_do_not_halt() {
        let mut rig = Rig::new(small());
        rig.stage.fail_effects = true;
        rig.audio.blocked = true;
        rig.start();
        rig.run_until(Phase::Armed, 2000.0);
        assert!(rig.activate());
        rig.run_until(Phase::PostSequence, 2000.0);
        rig.run_ms(1000.0);

        assert!(rig.session.world().boundaries_removed());
        assert_eq!(rig.session.live_words().len(), 2);
        assert!(rig.audio.played.is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest_while_spawning() {
        let mut rig = Rig::new(Config {
            spawn_limit: Some(6),
            max_words: 2,
            ..small()
        });
        rig.start();
        let first = rig.session.live_words().iter().next().unwrap().0;
        rig.run_until(Phase::AwaitingSelection, 2000.0);
        assert_eq!(rig.session.live_words().len(), 2);
        assert!(!rig.session.world().contains(first));
        assert_eq!(rig.session.summary().spawned, 6);
    }

    #[test]
    fn test_unlimited_never_selects() {
        let mut rig = Rig::new(Config {
            spawn_limit: None,
            max_words: 5,
            ..small()
        });
        rig.start();
        rig.run_ms(3000.0);
        assert_eq!(rig.session.phase(), Phase::Spawning);
        assert!(rig.session.live_words().len() <= 5);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = Rig::new(small());
        let mut b = Rig::new(small());
        a.start();
        b.start();
        a.run_ms(1500.0);
        b.run_ms(1500.0);
        let pa: Vec<_> = a.stage.placements().copied().collect();
        let pb: Vec<_> = b.stage.placements().copied().collect();
        assert_eq!(pa, pb);
        assert_eq!(a.session.chosen(), b.session.chosen());
    }

    #[test]
    fn test_update_accumulates_fixed_steps() {
        let mut rig = Rig::new(small());
        let mut out = Outputs::new(&mut rig.stage, &mut rig.audio);
        assert_eq!(rig.session.update(10.0, &mut out), 0);
        assert_eq!(rig.session.update(10.0, &mut out), 1);
        // Long frames are clamped to 100ms
        assert_eq!(rig.session.update(1000.0, &mut out), 6);
        assert!((rig.session.now_ms() - 7.0 * SIM_DT_MS).abs() < 1e-9);
    }
}
