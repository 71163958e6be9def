//! Audio playback using HTML audio elements
//!
//! Best effort only: a sound that fails to load or play is logged once per
//! attempt and otherwise ignored. Game logic never waits on audio.

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlAudioElement;

use crate::settings::Settings;
use crate::sim::{GameEvent, Sound};

/// Audio manager for the game
pub struct AudioManager {
    elements: HashMap<Sound, HtmlAudioElement>,
    settings: Settings,
    /// Silenced while the window is in the background
    suspended: bool,
}

impl AudioManager {
    pub fn new(settings: Settings) -> Self {
        Self {
            elements: HashMap::new(),
            settings,
            suspended: false,
        }
    }

    fn volume_for(&self, sound: Sound) -> f64 {
        if self.suspended {
            0.0
        } else {
            self.settings.volume_for(sound) as f64
        }
    }

    fn apply_volumes(&self) {
        for (sound, el) in &self.elements {
            el.set_volume(self.volume_for(*sound));
        }
    }

    /// Flip the player's mute preference and persist it
    pub fn toggle_muted(&mut self) -> bool {
        let muted = self.settings.toggle_muted();
        self.apply_volumes();
        muted
    }

    /// Temporarily silence everything without touching saved settings
    pub fn set_suspended(&mut self, suspended: bool) {
        if self.suspended != suspended {
            self.suspended = suspended;
            self.apply_volumes();
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get (or lazily create) the element for a sound
    fn element(&mut self, sound: Sound) -> Option<&HtmlAudioElement> {
        if !self.elements.contains_key(&sound) {
            match HtmlAudioElement::new_with_src(sound.asset_path()) {
                Ok(el) => {
                    el.set_loop(sound == Sound::Wind);
                    el.set_volume(self.volume_for(sound));
                    self.elements.insert(sound, el);
                }
                Err(e) => {
                    log::warn!("Failed to create audio for {:?}: {:?}", sound, e);
                    return None;
                }
            }
        }
        self.elements.get(&sound)
    }

    /// Play a sound from the start
    pub fn play(&mut self, sound: Sound) {
        let Some(el) = self.element(sound) else {
            return;
        };
        el.set_current_time(0.0);
        match el.play() {
            // Autoplay blocks and missing assets reject the promise
            Ok(promise) => {
                let on_reject: Closure<dyn FnMut(JsValue)> = Closure::once(move |e: JsValue| {
                    log::warn!("Playback of {:?} failed: {:?}", sound, e);
                });
                let _ = promise.catch(&on_reject);
                on_reject.forget();
            }
            Err(e) => log::warn!("Playback of {:?} failed: {:?}", sound, e),
        }
    }

    pub fn stop(&mut self, sound: Sound) {
        if let Some(el) = self.elements.get(&sound) {
            let _ = el.pause();
        }
    }

    /// Stop every character voice line
    pub fn silence_voices(&mut self) {
        for sound in Sound::VOICES {
            self.stop(sound);
        }
    }

    pub fn stop_all(&mut self) {
        for el in self.elements.values() {
            let _ = el.pause();
        }
    }

    /// React to the audio side of a game event
    pub fn handle(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Play(sound) => self.play(*sound),
            GameEvent::Stop(sound) => self.stop(*sound),
            GameEvent::SilenceVoices => self.silence_voices(),
            GameEvent::BoardDealt { .. } => self.stop_all(),
            _ => {}
        }
    }
}
