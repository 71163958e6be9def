//! Soul Match - a memory card game with a survive-the-bullets fight
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, matching, fight, collisions)
//! - `platform`: Browser input translation
//! - `audio`: Sound playback (wasm only)
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Longest frame the simulation will accept in one tick (ms)
    pub const MAX_FRAME_MS: u64 = 100;
    /// Nominal frame length used by headless runs (ms)
    pub const FRAME_MS: u64 = 16;
}
