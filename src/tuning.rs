//! Data-driven game balance
//!
//! Every number the simulation depends on lives here so a build can ship a
//! JSON override without touching code. Defaults reproduce the stock game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Board and scoring rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardTuning {
    /// Hearts at the start of a session
    pub lives: u8,
    /// Confirmed pairs needed to win
    pub pairs_to_win: u32,
}

impl Default for BoardTuning {
    fn default() -> Self {
        Self {
            lives: 4,
            pairs_to_win: 4,
        }
    }
}

/// Survival mini-game geometry and pacing
///
/// Distances are arena pixels, speeds are pixels per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FightTuning {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Top-left corner of the player box when a fight arms
    pub player_start: Vec2,
    pub player_size: f32,
    pub bullet_size: f32,
    pub move_speed: f32,
    /// Countdown length in whole seconds
    pub duration_secs: u32,
    pub countdown_period_ms: u64,
    pub spawn_period_ms: u64,
    /// How far outside the arena a bullet is placed when spawned
    pub spawn_offset: f32,
    /// How far outside the arena a bullet may drift before it is dropped
    pub despawn_margin: f32,
}

impl Default for FightTuning {
    fn default() -> Self {
        Self {
            arena_width: 500.0,
            arena_height: 500.0,
            player_start: Vec2::new(250.0, 250.0),
            player_size: 15.0,
            bullet_size: 15.0,
            move_speed: 8.0,
            duration_secs: 30,
            countdown_period_ms: 1000,
            spawn_period_ms: 500,
            spawn_offset: 15.0,
            despawn_margin: 30.0,
        }
    }
}

impl FightTuning {
    #[inline]
    pub fn arena_size(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height)
    }
}

/// Delays of the scripted presentation sequences (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineTuning {
    /// Pause before a matched pair turns green and is disabled
    pub match_reveal_ms: u64,
    /// Mismatch: red flash on, then off after `wrong_flash_len_ms`
    pub wrong_flash_ms: u64,
    pub wrong_flash_len_ms: u64,
    /// Mismatch: both cards turn face-down again
    pub unflip_ms: u64,
    /// Special trigger: taunt voice and armed art
    pub taunt_ms: u64,
    pub alarm_ms: u64,
    pub wind_ms: u64,
    /// Special trigger: fight overlay appears
    pub fight_handoff_ms: u64,
    /// Fight overlay shown until bullets start
    pub fight_arm_ms: u64,
    /// Survived banner shown before matching resumes
    pub survived_return_ms: u64,
    pub victory_sound_ms: u64,
    pub navigate_ms: u64,
}

impl Default for TimelineTuning {
    fn default() -> Self {
        Self {
            match_reveal_ms: 500,
            wrong_flash_ms: 200,
            wrong_flash_len_ms: 200,
            unflip_ms: 500,
            taunt_ms: 1500,
            alarm_ms: 4500,
            wind_ms: 5500,
            fight_handoff_ms: 10_000,
            fight_arm_ms: 5000,
            survived_return_ms: 2000,
            victory_sound_ms: 4000,
            navigate_ms: 16_000,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub board: BoardTuning,
    pub fight: FightTuning,
    pub timeline: TimelineTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parse an override, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring malformed tuning override: {}", e);
                Self::default()
            }
        }
    }
}
