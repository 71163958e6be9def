//! Player preferences
//!
//! Persisted separately from the game (which is never saved) in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::Sound;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Character voice lines volume (0.0 - 1.0)
    pub voice_volume: f32,
    /// Sound effects and music volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Visual ===
    /// Skip card shake/flash animations
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            voice_volume: 1.0,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective playback volume for a sound (0 when muted)
    pub fn volume_for(&self, sound: Sound) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = if sound.is_voice() || matches!(sound, Sound::FloweyTaunt | Sound::FloweyFound) {
            self.voice_volume
        } else {
            self.sfx_volume
        };
        (self.master_volume * channel).clamp(0.0, 1.0)
    }

    /// Flip the mute preference and persist it; returns the new state
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.save();
        self.muted
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "soul_match_settings";

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    /// Load saved preferences, falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let saved = Self::storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());
        match saved.map(|json| serde_json::from_str::<Self>(&json)) {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                log::warn!("Discarding unreadable settings: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Persist preferences; failures are logged and otherwise ignored
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        let written = serde_json::to_string(self)
            .map_err(|e| format!("{}", e))
            .and_then(|json| {
                storage
                    .set_item(Self::STORAGE_KEY, &json)
                    .map_err(|e| format!("{:?}", e))
            });
        if let Err(e) = written {
            log::warn!("Saving settings failed: {}", e);
        }
    }

    /// Native builds keep preferences in memory only
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_is_silent() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.volume_for(Sound::Battle), 0.0);
        assert_eq!(settings.volume_for(Sound::SansVoice), 0.0);
    }

    #[test]
    fn test_channels_scale_by_master() {
        let settings = Settings {
            master_volume: 0.5,
            voice_volume: 0.4,
            sfx_volume: 1.0,
            ..Default::default()
        };
        assert!((settings.volume_for(Sound::TorielVoice) - 0.2).abs() < 1e-6);
        assert!((settings.volume_for(Sound::FloweyTaunt) - 0.2).abs() < 1e-6);
        assert!((settings.volume_for(Sound::Wrong) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_muted() {
        let mut settings = Settings::default();
        assert!(settings.toggle_muted());
        assert_eq!(settings.volume_for(Sound::Victory), 0.0);
        assert!(!settings.toggle_muted());
        assert!((settings.volume_for(Sound::Victory) - 0.8).abs() < 1e-6);

        // What gets written is what comes back
        settings.toggle_muted();
        let json = serde_json::to_string(&settings).unwrap();
        let restored: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_old_json_fills_new_fields() {
        let settings: Settings = serde_json::from_str(r#"{ "muted": true }"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.master_volume, 0.8);
    }
}
