//! Session state and the messages flowing in and out of it
//!
//! A [`GameSession`] owns everything one play-through needs: the board, the
//! optional fight, the scheduler, the RNG, and both queues. Platforms push
//! [`InputEvent`]s in, call [`tick`](super::tick::tick), and drain
//! [`GameEvent`]s out.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::card::{Board, Character};
use super::entity::Direction;
use super::fight::FightSession;
use super::matcher::MatchState;
use super::schedule::Scheduler;
use crate::tuning::Tuning;

/// Sound cues the core asks the platform to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    PapyrusVoice,
    TorielVoice,
    AsgoreVoice,
    SansVoice,
    /// Special card revealed
    FloweyTaunt,
    /// Armed pair matched
    FloweyFound,
    /// Mismatched pair
    Wrong,
    /// Fight sequence starting
    Battle,
    Alarm,
    /// Ambient loop during the fight
    Wind,
    Survived,
    Death,
    Evil,
    Victory,
}

impl Sound {
    /// Character voice lines; only one plays at a time
    pub const VOICES: [Sound; 4] = [
        Sound::PapyrusVoice,
        Sound::TorielVoice,
        Sound::AsgoreVoice,
        Sound::SansVoice,
    ];

    /// Asset path relative to the page
    pub fn asset_path(&self) -> &'static str {
        match self {
            Sound::PapyrusVoice => "./voices/paparyus.mp3",
            Sound::TorielVoice => "./voices/toriel.mp3",
            Sound::AsgoreVoice => "./voices/asgore.mp3",
            Sound::SansVoice => "./voices/sans.mp3",
            Sound::FloweyTaunt => "./voices/flowey.mp3",
            Sound::FloweyFound => "./voices/flowey-talking.mp3",
            Sound::Wrong => "./sfx/death.mp3",
            Sound::Battle => "./sfx/battle.mp3",
            Sound::Alarm => "./sfx/mus_f_alarm.ogg",
            Sound::Wind => "./sfx/mus_f_wind1.ogg",
            Sound::Survived => "./sfx/survived.mp3",
            Sound::Death => "./sfx/death2.mp3",
            Sound::Evil => "./sfx/evil.ogg",
            Sound::Victory => "./sfx/afterWIN.ogg",
        }
    }

    pub fn is_voice(&self) -> bool {
        Self::VOICES.contains(self)
    }
}

/// Effects requested from the presentation layer (fire-and-forget)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fresh board was dealt (session start or restart)
    BoardDealt { faces: Vec<Character>, lives: u8 },
    CardFlipped { index: usize, face: Character },
    /// Card art swaps to the armed identity
    CardArmed { index: usize },
    /// The armed twin joined the board, face-down
    CardDealt { index: usize, face: Character },
    CardsMatched { first: usize, second: usize },
    CardsWrong { first: usize, second: usize, lit: bool },
    CardsHidden { first: usize, second: usize },
    CardHidden { index: usize },
    LifeLost { remaining: u8 },
    Dialogue { speaker: Character },
    Play(Sound),
    Stop(Sound),
    /// Stop every character voice line
    SilenceVoices,
    FightOverlay { visible: bool },
    FightStarted,
    Countdown { remaining: u32 },
    FightSurvived,
    FightLost,
    GameOver,
    Won,
    /// Leave for the name-entry screen
    Navigate,
}

/// Raw input delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Press(Direction),
    Release(Direction),
    Flip(usize),
}

/// Deferred work run by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Plain presentation effect
    Emit(GameEvent),
    RevealMatch { first: usize, second: usize },
    WrongFlash { first: usize, second: usize, lit: bool },
    Unflip { first: usize, second: usize },
    BeginFight,
    ArmFight,
    SpawnBullet,
    CountdownTick,
    ResumeMatching,
    Navigate,
}

/// One play-through of the board
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Seed of the current deal
    pub seed: u64,
    pub tuning: Tuning,
    pub matcher: MatchState,
    /// Present from fight hand-off until matching resumes
    pub fight: Option<FightSession>,
    pub scheduler: Scheduler<Step>,
    /// Outbound effects, drained by the platform
    pub events: Vec<GameEvent>,
    /// Frames simulated so far
    pub frame_count: u64,
    pub(crate) inputs: VecDeque<InputEvent>,
    pub(crate) rng: Pcg32,
}

impl GameSession {
    /// Create a session and deal a shuffled board
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Board::shuffled(&mut rng);
        Self::create(seed, tuning, board, rng)
    }

    /// Create a session with a fixed layout
    pub fn with_board(seed: u64, tuning: Tuning, board: Board) -> Self {
        let rng = Pcg32::seed_from_u64(seed);
        Self::create(seed, tuning, board, rng)
    }

    fn create(seed: u64, tuning: Tuning, board: Board, rng: Pcg32) -> Self {
        let lives = tuning.board.lives;
        let mut session = Self {
            seed,
            tuning,
            matcher: MatchState::new(board, lives),
            fight: None,
            scheduler: Scheduler::new(),
            events: Vec::new(),
            frame_count: 0,
            inputs: VecDeque::new(),
            rng,
        };
        session.start();
        session
    }

    /// Announce the deal to the presentation layer
    fn start(&mut self) {
        let faces = self.matcher.board.cards.iter().map(|c| c.face).collect();
        self.events.push(GameEvent::BoardDealt {
            faces,
            lives: self.matcher.lives,
        });
        log::info!(
            "Session started (seed {}, {} cards, {} lives)",
            self.seed,
            self.matcher.board.len(),
            self.matcher.lives
        );
    }

    /// Cancel all pending work and tear down any fight
    pub fn end(&mut self) {
        if let Some(fight) = self.fight.as_mut() {
            fight.teardown(&mut self.scheduler, super::fight::FightPhase::Failed);
        }
        self.fight = None;
        self.scheduler.clear();
        self.inputs.clear();
    }

    /// Throw the current play-through away and deal again
    pub fn restart(&mut self, seed: u64) {
        self.end();
        let tuning = self.tuning.clone();
        *self = Self::new(seed, tuning);
        self.events.insert(0, GameEvent::Stop(Sound::Wind));
    }

    /// Queue an input for the next tick
    pub fn push_input(&mut self, input: InputEvent) {
        self.inputs.push_back(input);
    }

    /// Take every effect produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_fight_active(&self) -> bool {
        self.fight.as_ref().is_some_and(|f| f.is_active())
    }
}
