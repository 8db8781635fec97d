//! Browser export
//!
//! A JS host creates a `WebSession`, calls `update` from its animation frame
//! loop and applies the drained commands and placements to its DOM. Text is
//! measured by a host callback `(text, fontPx) => ({ width, height })`.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::audio::HtmlAudio;
use crate::config::{ConfigFile, Viewport};
use crate::headless::{HeadlessStage, Placement};
use crate::sim::{RapierPhysics, Session};
use crate::surface::{Outputs, VisualId, estimate_text_size};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already installed".into());
    }
    log::info!("Falling Words wasm module loaded");
}

/// Current window size and touch capability
fn window_viewport() -> Result<Viewport, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let width = window.inner_width()?.as_f64().unwrap_or(0.0) as f32;
    let height = window.inner_height()?.as_f64().unwrap_or(0.0) as f32;
    let touch_points = window.navigator().max_touch_points().max(0) as u32;
    Ok(Viewport::new(width, height).with_touch_points(touch_points))
}

/// Ask the host to measure `text`; fall back to the estimate if it cannot
fn measure_with(callback: &js_sys::Function, text: &str, font_px: f32) -> Vec2 {
    let measured = callback
        .call2(
            &JsValue::NULL,
            &JsValue::from_str(text),
            &JsValue::from_f64(f64::from(font_px)),
        )
        .ok()
        .and_then(|size| {
            let w = js_sys::Reflect::get(&size, &"width".into()).ok()?.as_f64()?;
            let h = js_sys::Reflect::get(&size, &"height".into()).ok()?.as_f64()?;
            Some(Vec2::new(w as f32, h as f32))
        });
    measured.unwrap_or_else(|| {
        log::debug!("Measure callback failed for '{text}', estimating");
        estimate_text_size(text, font_px)
    })
}

#[wasm_bindgen]
pub struct WebSession {
    session: Session<RapierPhysics>,
    stage: HeadlessStage,
    audio: HtmlAudio,
}

#[wasm_bindgen]
impl WebSession {
    /// `config_json` is a `{ base, mobile }` document (either part optional)
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        measure: js_sys::Function,
        seed: Option<f64>,
    ) -> Result<WebSession, JsValue> {
        let file = match config_json {
            Some(json) => ConfigFile::from_json(&json)
                .map_err(|e| JsValue::from_str(&format!("bad config: {e}")))?,
            None => ConfigFile::default(),
        };
        let viewport = window_viewport()?;
        let config = file.resolve(&viewport);
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        log::info!(
            "Session {}x{} seed {seed}",
            viewport.width,
            viewport.height
        );

        let audio = HtmlAudio::new(&config);
        let stage = HeadlessStage::with_measure(Box::new(move |text: &str, font_px: f32| {
            measure_with(&measure, text, font_px)
        }));
        Ok(WebSession {
            session: Session::new(config, viewport, RapierPhysics::new(), seed),
            stage,
            audio,
        })
    }

    pub fn start(&mut self) {
        let mut out = Outputs::new(&mut self.stage, &mut self.audio);
        self.session.start(&mut out);
    }

    /// Advance by the frame delta; returns the number of fixed steps run
    pub fn update(&mut self, dt_ms: f64) -> u32 {
        let mut out = Outputs::new(&mut self.stage, &mut self.audio);
        self.session.update(dt_ms, &mut out)
    }

    /// The user clicked or tapped the element with this id
    pub fn activate(&mut self, element: u32) -> bool {
        let hit = self.session.live_words().body_of(VisualId(element));
        if hit.is_none() || hit != self.session.chosen() {
            return false;
        }
        let mut out = Outputs::new(&mut self.stage, &mut self.audio);
        self.session.activate(&mut out)
    }

    /// Re-read the window size (debounced inside the session)
    pub fn resize(&mut self) -> Result<(), JsValue> {
        let viewport = window_viewport()?;
        self.session.resize(viewport);
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    pub fn phase(&self) -> Result<JsValue, JsValue> {
        let json = serde_json::to_string(&self.session.phase())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(JsValue::from_str(json.trim_matches('"')))
    }

    /// Queued stage commands since the last call, as a JSON array
    pub fn drain_commands(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.stage.drain_commands())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Latest transform of every live word element, as a JSON array
    pub fn placements(&self) -> Result<String, JsValue> {
        let placements: Vec<&Placement> = self.stage.placements().collect();
        serde_json::to_string(&placements).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn summary(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.summary())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
