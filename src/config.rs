//! Tunables and viewport-conditional overrides
//!
//! Resolved once before the session starts: a base set merged with a
//! compact-viewport override set. Nothing reads configuration ambiently after
//! that; every component gets the resolved `Config`.

use serde::{Deserialize, Serialize};

/// Post-sequence decorative sprinkle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprinkleConfig {
    /// Glyphs placed in turn (cycled)
    pub glyphs: Vec<String>,
    /// Spacing of the placement grid
    pub grid_step_px: f32,
    /// Padding added around the message box before excluding grid points
    pub exclusion_pad_px: f32,
    /// Maximum number of glyphs placed
    pub max_count: usize,
    /// Delay before the first glyph and between the first two
    pub step_ms: f64,
    /// Added to the inter-glyph delay after each placement
    pub slowdown_ms: f64,
    /// Glyph font size
    pub font_size_px: f32,
    /// Seed for the one-time grid shuffle
    pub shuffle_seed: u64,
}

impl Default for SprinkleConfig {
    fn default() -> Self {
        Self {
            glyphs: vec!["✦".into(), "✧".into(), "❤".into()],
            grid_step_px: 90.0,
            exclusion_pad_px: 40.0,
            max_count: 40,
            step_ms: 250.0,
            slowdown_ms: 0.0,
            font_size_px: 24.0,
            shuffle_seed: 7,
        }
    }
}

/// Complete, resolved set of tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Spawning ===
    /// Texts cycled through by the spawner
    pub words: Vec<String>,
    /// Words dropped synchronously at start
    pub initial_burst: u32,
    /// Interval between drops
    pub spawn_every_ms: f64,
    /// Total words spawned, burst included. `None` spawns forever
    pub spawn_limit: Option<u32>,
    /// Live-word cap, oldest evicted beyond it
    pub max_words: usize,
    /// Fraction of the viewport width used for the random x offset around center
    pub spawn_horizontal_spread: f32,
    /// Minimum pixels above the top edge
    pub spawn_height_min: f32,
    /// Extra random pixels above the top edge
    pub spawn_height_rand: f32,
    /// Gap kept between a spawned word and the viewport sides
    pub spawn_margin_px: f32,
    pub rotation_min_deg: f32,
    pub rotation_max_deg: f32,

    // === Sizes ===
    pub min_word_width: f32,
    pub min_word_height: f32,
    pub font_size_px: f32,

    // === Physics ===
    pub gravity: f32,

    // === Selection ===
    /// Settle time between the last spawn and selection
    pub selection_delay_ms: f64,
    /// Red transition after activation; also drives the blink period
    pub red_transition_ms: f64,

    // === Blast ===
    /// Base outward speed (px/tick)
    pub blast_strength: f32,
    /// Max angular velocity kick
    pub blast_spin: f32,
    /// Duration of the decaying outward wind
    pub blast_wind_ms: f64,
    /// Base outward wind force per tick
    pub blast_wind_force: f32,
    pub shake_ms: f64,
    pub shake_mag: f32,
    pub particle_count: u32,
    pub particle_max_len: f32,
    /// Chosen word fades over this long...
    pub chosen_fade_ms: f64,
    /// ...and is destroyed after this long
    pub chosen_remove_ms: f64,

    // === Post-blast messages ===
    pub post_message_delay_ms: f64,
    pub post_message_fade_ms: f64,
    pub post_message_stagger_ms: f64,
    pub post_message_line_gap_px: f32,
    /// Falls back to `font_size_px`
    pub post_message_font_size_px: Option<f32>,
    pub post_messages: Vec<String>,
    /// Optional decorative glyphs after the last line starts revealing
    pub sprinkle: Option<SprinkleConfig>,

    // === Sounds ===
    pub sound_pop_src: String,
    pub sound_music_src: String,
    pub sound_pop_volume: f32,
    pub sound_music_volume: f32,
    pub sound_music_loop: bool,
    /// Music starts this long after the blast
    pub sound_music_delay_ms: f64,
    /// Pop plays this long before the blast
    pub sound_pop_pre_ms: f64,

    // === Viewport ===
    /// Compact overrides apply at or below this width
    pub mobile_breakpoint_px: f32,
    /// Boundary rebuild after a resize waits this long for the resize to settle
    pub resize_debounce_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            words: ["baby", "love", "mine", "darling"]
                .into_iter()
                .map(String::from)
                .collect(),
            initial_burst: 1,
            spawn_every_ms: 150.0,
            spawn_limit: Some(130),
            max_words: 130,
            spawn_horizontal_spread: 1.0,
            spawn_height_min: 200.0,
            spawn_height_rand: 300.0,
            spawn_margin_px: 4.0,
            rotation_min_deg: -60.0,
            rotation_max_deg: 60.0,

            min_word_width: 0.0,
            min_word_height: 0.0,
            font_size_px: 50.0,

            gravity: 0.5,

            selection_delay_ms: 600.0,
            red_transition_ms: 1000.0,

            blast_strength: 40.0,
            blast_spin: 1.5,
            blast_wind_ms: 600.0,
            blast_wind_force: 0.0009,
            shake_ms: 700.0,
            shake_mag: 40.0,
            particle_count: 50,
            particle_max_len: 500.0,
            chosen_fade_ms: 300.0,
            chosen_remove_ms: 320.0,

            post_message_delay_ms: 10_000.0,
            post_message_fade_ms: 6000.0,
            post_message_stagger_ms: 3000.0,
            post_message_line_gap_px: 50.0,
            post_message_font_size_px: Some(50.0),
            post_messages: vec![
                "No words are enough for you ❤️".into(),
                "You're my favorite person in this universe 🌌".into(),
                "Happy Birthday, my love 💫".into(),
            ],
            sprinkle: None,

            sound_pop_src: "sounds/pop.mp3".into(),
            sound_music_src: "sounds/piano.wav".into(),
            sound_pop_volume: 0.6,
            sound_music_volume: 0.25,
            sound_music_loop: true,
            sound_music_delay_ms: 600.0,
            sound_pop_pre_ms: 300.0,

            mobile_breakpoint_px: 520.0,
            resize_debounce_ms: 150.0,
        }
    }
}

impl Config {
    /// Lines shown after the blast (generic greetings when none are configured)
    pub fn message_lines(&self) -> Vec<String> {
        if self.post_messages.is_empty() {
            vec![
                "Happy Birthday!".into(),
                "Wishing you joy and love".into(),
                "Have an amazing day!".into(),
            ]
        } else {
            self.post_messages.clone()
        }
    }

    /// Font size for the post-blast lines
    pub fn message_font_px(&self) -> f32 {
        self.post_message_font_size_px.unwrap_or(self.font_size_px)
    }

    /// Whether spawning can run out (and therefore selection can ever happen)
    pub fn spawn_is_bounded(&self) -> bool {
        self.spawn_limit.is_some()
    }

    /// Period of the armed blink
    pub fn blink_period_ms(&self) -> f64 {
        let base = if self.red_transition_ms > 0.0 {
            self.red_transition_ms
        } else {
            crate::consts::FALLBACK_BLINK_MS
        };
        base.max(crate::consts::MIN_BLINK_MS)
    }

    /// Offset from activation at which the pop pre-cue fires
    pub fn pop_pre_delay_ms(&self) -> f64 {
        (self.red_transition_ms - self.sound_pop_pre_ms.max(0.0)).max(0.0)
    }
}

/// Partial config applied on compact viewports. Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub spawn_every_ms: Option<f64>,
    pub spawn_limit: Option<u32>,
    pub max_words: Option<usize>,
    pub font_size_px: Option<f32>,
    pub post_message_font_size_px: Option<f32>,
    pub post_message_line_gap_px: Option<f32>,
    pub post_message_delay_ms: Option<f64>,
    pub post_message_fade_ms: Option<f64>,
    pub post_message_stagger_ms: Option<f64>,
    pub blast_strength: Option<f32>,
    pub blast_spin: Option<f32>,
    pub blast_wind_ms: Option<f64>,
    pub blast_wind_force: Option<f32>,
    pub shake_ms: Option<f64>,
    pub shake_mag: Option<f32>,
    pub particle_count: Option<u32>,
    pub particle_max_len: Option<f32>,
    pub gravity: Option<f32>,
    pub sprinkle: Option<SprinkleConfig>,
}

impl ConfigOverrides {
    /// Phone-sized defaults
    pub fn mobile() -> Self {
        Self {
            spawn_every_ms: Some(300.0),
            spawn_limit: Some(120),
            max_words: Some(120),
            font_size_px: Some(30.0),
            post_message_font_size_px: Some(20.0),
            post_message_line_gap_px: Some(36.0),
            post_message_delay_ms: Some(8000.0),
            post_message_fade_ms: Some(4500.0),
            post_message_stagger_ms: Some(2200.0),
            blast_strength: Some(15.0),
            blast_spin: Some(1.2),
            blast_wind_ms: Some(300.0),
            shake_ms: Some(700.0),
            shake_mag: Some(26.0),
            particle_count: Some(40),
            particle_max_len: Some(360.0),
            ..Default::default()
        }
    }

    /// Apply every set field onto `config`
    pub fn apply(&self, config: &mut Config) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = &self.$field { config.$field = v.clone(); })*
            };
        }
        take!(
            spawn_every_ms,
            max_words,
            font_size_px,
            post_message_line_gap_px,
            post_message_delay_ms,
            post_message_fade_ms,
            post_message_stagger_ms,
            blast_strength,
            blast_spin,
            blast_wind_ms,
            blast_wind_force,
            shake_ms,
            shake_mag,
            particle_count,
            particle_max_len,
            gravity,
        );
        if let Some(limit) = self.spawn_limit {
            config.spawn_limit = Some(limit);
        }
        if let Some(px) = self.post_message_font_size_px {
            config.post_message_font_size_px = Some(px);
        }
        if let Some(sprinkle) = &self.sprinkle {
            config.sprinkle = Some(sprinkle.clone());
        }
    }
}

/// Scene size and input hints used to pick the override set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Number of simultaneous touch points the device reports
    #[serde(default)]
    pub touch_points: u32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            touch_points: 0,
        }
    }

    pub fn with_touch_points(mut self, touch_points: u32) -> Self {
        self.touch_points = touch_points;
        self
    }

    /// Narrow screen, or a small touch device in either orientation
    pub fn is_compact(&self, breakpoint: f32) -> bool {
        let narrow = self.width <= breakpoint;
        let small_touch = self.touch_points > 0 && self.width.min(self.height) <= breakpoint;
        narrow || small_touch
    }

    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// On-disk/over-the-wire configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub base: Config,
    pub mobile: ConfigOverrides,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            base: Config::default(),
            mobile: ConfigOverrides::mobile(),
        }
    }
}

impl ConfigFile {
    /// Parse a JSON document; absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Merge base and overrides for this viewport
    pub fn resolve(&self, viewport: &Viewport) -> Config {
        let mut config = self.base.clone();
        if viewport.is_compact(self.base.mobile_breakpoint_px) {
            self.mobile.apply(&mut config);
            log::info!(
                "Compact viewport {}x{}: mobile overrides applied",
                viewport.width,
                viewport.height
            );
        }
        config
    }
}
