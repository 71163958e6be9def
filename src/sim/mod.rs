//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated millisecond clock only (no wall time)
//! - Seeded RNG only
//! - Stable iteration order (bullets by spawn order, timers by due time then id)
//! - No DOM, audio, or platform dependencies

pub mod card;
pub mod collision;
pub mod entity;
pub mod fight;
pub mod matcher;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;

pub use card::{Board, Card, Character};
pub use collision::{Aabb, first_hit};
pub use entity::{Bullet, Direction, Edge, Facing, HeldDirections, Player};
pub use fight::{FightPhase, FightSession};
pub use matcher::{FlipOutcome, MatchPhase, MatchState, Rejection};
pub use schedule::{Scheduler, TimerId};
pub use spawner::{EdgeProfile, spawn_bullet};
pub use state::{GameEvent, GameSession, InputEvent, Sound, Step};
pub use tick::tick;
