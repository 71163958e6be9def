//! Platform abstraction layer
//!
//! Translates browser input into simulation input:
//! - Keyboard keys to directions
//! - Card element positions to flip requests
//! - Animation-frame timestamps to simulation milliseconds

use crate::consts::MAX_FRAME_MS;
use crate::sim::{Direction, InputEvent};

/// Turns `requestAnimationFrame` timestamps into whole-millisecond ticks.
///
/// Fractions of a millisecond are carried into the next frame so the
/// simulated clock keeps pace with wall time at any refresh rate.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_time: Option<f64>,
    accumulator: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds to simulate for the frame stamped `time`.
    ///
    /// The first frame only sets the reference point. Gaps longer than
    /// `MAX_FRAME_MS` are capped and their excess is dropped.
    pub fn advance(&mut self, time: f64) -> u64 {
        let Some(last) = self.last_time.replace(time) else {
            return 0;
        };
        let dt = (time - last).clamp(0.0, MAX_FRAME_MS as f64);
        self.accumulator += dt;
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        whole as u64
    }
}

/// Key that toggles the saved mute preference
pub fn is_mute_key(key: &str) -> bool {
    matches!(key, "m" | "M")
}

/// Map a `KeyboardEvent.key` value to a direction
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Map a keydown (`pressed`) or keyup to an input event
pub fn key_input(key: &str, pressed: bool) -> Option<InputEvent> {
    let dir = direction_for_key(key)?;
    Some(if pressed {
        InputEvent::Press(dir)
    } else {
        InputEvent::Release(dir)
    })
}

/// Parse a card's `data-index` attribute
pub fn card_input(data_index: &str) -> Option<InputEvent> {
    data_index.trim().parse().ok().map(InputEvent::Flip)
}
