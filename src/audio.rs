//! Audio output using HTML media elements
//!
//! Two preloaded clips: a short pop around the blast and a looping music bed
//! after it. Browsers may reject `play()` (autoplay policy); the rejected
//! promise is swallowed and only logged.

use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::config::Config;
use crate::error::CapabilityError;
use crate::surface::{AudioOut, Sound};

/// Audio output backed by `<audio>` elements
pub struct HtmlAudio {
    pop: Option<HtmlAudioElement>,
    music: Option<HtmlAudioElement>,
}

fn load(src: &str, volume: f32, looped: bool) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(src) {
        Ok(el) => {
            el.set_preload("auto");
            el.set_volume(f64::from(volume.clamp(0.0, 1.0)));
            el.set_loop(looped);
            Some(el)
        }
        Err(e) => {
            log::warn!("Failed to create audio element for {src}: {e:?}");
            None
        }
    }
}

impl HtmlAudio {
    /// Create both clips. Call under a user gesture so later playback is allowed.
    pub fn new(config: &Config) -> Self {
        Self {
            pop: load(&config.sound_pop_src, config.sound_pop_volume, false),
            music: load(
                &config.sound_music_src,
                config.sound_music_volume,
                config.sound_music_loop,
            ),
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        for el in [&self.pop, &self.music].into_iter().flatten() {
            el.set_muted(muted);
        }
    }
}

impl AudioOut for HtmlAudio {
    fn play(&mut self, sound: Sound) -> Result<(), CapabilityError> {
        let el = match sound {
            Sound::Pop => self.pop.as_ref(),
            Sound::Music => self.music.as_ref(),
        }
        .ok_or_else(|| CapabilityError::audio(format!("{sound:?} not loaded")))?;

        // Pop always restarts from the top
        if sound == Sound::Pop {
            el.set_current_time(0.0);
        }
        let promise = el
            .play()
            .map_err(|e| CapabilityError::audio(format!("{e:?}")))?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::debug!("{sound:?} playback rejected: {e:?}");
            }
        });
        Ok(())
    }
}
