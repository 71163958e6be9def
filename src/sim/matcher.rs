//! Card-flip and pair-matching state machine
//!
//! Flips are accepted only while the board is unlocked and the session is in
//! progress; everything else is rejected without touching state. Finding the
//! special card hands control to the fight controller.

use serde::{Deserialize, Serialize};

use super::card::{Board, Character};
use super::state::{GameEvent, GameSession, Sound, Step};

/// Where the matching game currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Nothing pending
    Idle,
    /// One card waiting for its partner
    OneFlipped,
    /// A matched pair is being revealed
    Resolving,
    /// A mismatched pair is flashing before it turns back over
    Locked,
    /// Special card found; the fight owns the session until it ends
    SpecialTriggered,
    GameOver,
    Won,
}

/// Why a flip was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// A pair is resolving
    Locked,
    /// Game over, won, or the fight sequence is running
    NotInProgress,
    AlreadyFaceUp,
    Matched,
    OutOfRange,
}

/// Result of a flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipOutcome {
    Rejected(Rejection),
    /// First card of a pair
    Pending,
    Matched(Character),
    Mismatched,
    /// Mismatch that spent the last life
    GameOver,
    SpecialTriggered,
}

/// Board-side state of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub board: Board,
    pub phase: MatchPhase,
    pub lives: u8,
    pub matched: u32,
    /// Card waiting for a partner
    pub first: Option<usize>,
    pub special_consumed: bool,
    /// Position of the consumed special card once armed
    pub armed: Option<usize>,
}

impl MatchState {
    pub fn new(board: Board, lives: u8) -> Self {
        Self {
            board,
            phase: MatchPhase::Idle,
            lives,
            matched: 0,
            first: None,
            special_consumed: false,
            armed: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.phase, MatchPhase::Resolving | MatchPhase::Locked)
    }

    pub fn is_in_progress(&self) -> bool {
        !matches!(
            self.phase,
            MatchPhase::SpecialTriggered | MatchPhase::GameOver | MatchPhase::Won
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, MatchPhase::GameOver | MatchPhase::Won)
    }

    /// Return to waiting for input
    pub(crate) fn settle(&mut self) {
        self.phase = if self.first.is_some() {
            MatchPhase::OneFlipped
        } else {
            MatchPhase::Idle
        };
    }

    fn check(&self, index: usize) -> Result<(), Rejection> {
        if !self.is_in_progress() {
            return Err(Rejection::NotInProgress);
        }
        if self.is_locked() {
            return Err(Rejection::Locked);
        }
        let card = self.board.get(index).ok_or(Rejection::OutOfRange)?;
        if card.matched {
            return Err(Rejection::Matched);
        }
        if card.face_up {
            return Err(Rejection::AlreadyFaceUp);
        }
        Ok(())
    }
}

impl GameSession {
    /// Flip the card at `index`
    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if let Err(reason) = self.matcher.check(index) {
            log::debug!("Flip {} rejected: {:?}", index, reason);
            return FlipOutcome::Rejected(reason);
        }

        let Some(card) = self.matcher.board.get_mut(index) else {
            return FlipOutcome::Rejected(Rejection::OutOfRange);
        };
        card.face_up = true;
        let face = card.face;
        self.events.push(GameEvent::CardFlipped { index, face });

        match face {
            Character::Flowey if !self.matcher.special_consumed => {
                self.trigger_special(index);
                return FlipOutcome::SpecialTriggered;
            }
            Character::EvilFlowey => self.events.push(GameEvent::Play(Sound::Evil)),
            _ => {}
        }

        match self.matcher.first.take() {
            None => {
                self.matcher.first = Some(index);
                self.matcher.phase = MatchPhase::OneFlipped;
                FlipOutcome::Pending
            }
            Some(first) => self.resolve_pair(first, index),
        }
    }

    fn trigger_special(&mut self, index: usize) {
        let m = &mut self.matcher;
        m.special_consumed = true;
        m.phase = MatchPhase::SpecialTriggered;
        m.armed = Some(index);
        let twin = m.board.arm_special(index);

        self.events.push(GameEvent::SilenceVoices);
        self.events.push(GameEvent::Play(Sound::Battle));
        self.events.push(GameEvent::Dialogue {
            speaker: Character::Flowey,
        });
        if let Some(twin) = twin {
            self.events.push(GameEvent::CardDealt {
                index: twin,
                face: Character::EvilFlowey,
            });
        }

        let t = &self.tuning.timeline;
        self.scheduler.script([
            (t.taunt_ms, Step::Emit(GameEvent::Play(Sound::FloweyTaunt))),
            (t.taunt_ms, Step::Emit(GameEvent::CardArmed { index })),
            (t.alarm_ms, Step::Emit(GameEvent::Play(Sound::Alarm))),
            (t.wind_ms, Step::Emit(GameEvent::Play(Sound::Wind))),
            (t.fight_handoff_ms, Step::BeginFight),
        ]);
        log::info!("Special card {} found, fight in {} ms", index, t.fight_handoff_ms);
    }

    fn resolve_pair(&mut self, first: usize, second: usize) -> FlipOutcome {
        self.matcher.phase = MatchPhase::Resolving;
        let a = self.matcher.board.get(first).map(|c| c.face);
        let b = self.matcher.board.get(second).map(|c| c.face);

        match (a, b) {
            (Some(a), Some(b)) if a == b => {
                self.matcher.matched += 1;
                self.events.push(GameEvent::SilenceVoices);
                self.events.push(GameEvent::Play(a.match_voice()));
                if a.dialogue().is_some() {
                    self.events.push(GameEvent::Dialogue { speaker: a });
                }
                self.scheduler.after(
                    self.tuning.timeline.match_reveal_ms,
                    Step::RevealMatch { first, second },
                );
                log::debug!("Pair {:?} matched ({} total)", a, self.matcher.matched);
                FlipOutcome::Matched(a)
            }
            _ => {
                self.events.push(GameEvent::Play(Sound::Wrong));
                self.matcher.lives = self.matcher.lives.saturating_sub(1);
                self.events.push(GameEvent::LifeLost {
                    remaining: self.matcher.lives,
                });

                if self.matcher.lives == 0 {
                    self.game_over();
                    return FlipOutcome::GameOver;
                }

                self.matcher.phase = MatchPhase::Locked;
                let t = &self.tuning.timeline;
                self.scheduler.script([
                    (t.wrong_flash_ms, Step::WrongFlash { first, second, lit: true }),
                    (
                        t.wrong_flash_ms + t.wrong_flash_len_ms,
                        Step::WrongFlash { first, second, lit: false },
                    ),
                    (t.unflip_ms, Step::Unflip { first, second }),
                ]);
                FlipOutcome::Mismatched
            }
        }
    }

    /// Confirm a matched pair once its reveal delay has passed
    pub(crate) fn reveal_match(&mut self, first: usize, second: usize) {
        if self.matcher.phase != MatchPhase::Resolving {
            return;
        }
        for index in [first, second] {
            if let Some(card) = self.matcher.board.get_mut(index) {
                card.matched = true;
                card.wrong = false;
            }
        }
        self.events.push(GameEvent::CardsMatched { first, second });

        if self.matcher.matched >= self.tuning.board.pairs_to_win {
            self.matcher.phase = MatchPhase::Won;
            self.events.push(GameEvent::Won);
            let t = &self.tuning.timeline;
            self.scheduler.script([
                (t.victory_sound_ms, Step::Emit(GameEvent::Play(Sound::Victory))),
                (t.navigate_ms, Step::Navigate),
            ]);
            log::info!("All {} pairs matched", self.matcher.matched);
        } else {
            self.matcher.settle();
        }
    }

    pub(crate) fn flash_wrong(&mut self, first: usize, second: usize, lit: bool) {
        if self.matcher.phase != MatchPhase::Locked {
            return;
        }
        for index in [first, second] {
            if let Some(card) = self.matcher.board.get_mut(index) {
                card.wrong = lit;
            }
        }
        self.events.push(GameEvent::CardsWrong { first, second, lit });
    }

    /// Turn a mismatched pair back over; the only way out of `Locked`
    pub(crate) fn unflip(&mut self, first: usize, second: usize) {
        if self.matcher.phase != MatchPhase::Locked {
            return;
        }
        for index in [first, second] {
            if let Some(card) = self.matcher.board.get_mut(index) {
                card.face_up = false;
                card.wrong = false;
            }
        }
        self.events.push(GameEvent::CardsHidden { first, second });
        self.matcher.settle();
    }

    /// Terminal loss: out of lives or hit during the fight
    pub(crate) fn game_over(&mut self) {
        if self.matcher.is_terminal() {
            return;
        }
        self.matcher.phase = MatchPhase::GameOver;
        self.matcher.first = None;
        self.events.push(GameEvent::Play(Sound::Death));
        self.events.push(GameEvent::Play(Sound::Evil));
        self.events.push(GameEvent::GameOver);
        log::info!("Game over ({} pairs matched)", self.matcher.matched);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::card::Character::*;
    use crate::sim::tick::tick;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    /// Pairs at (0,1) (2,3) (4,5) (6,7), special at 8
    fn session() -> GameSession {
        let board = Board::from_faces([
            Papyrus, Papyrus, Toriel, Toriel, Asgore, Asgore, Sans, Sans, Flowey,
        ]);
        let mut s = GameSession::with_board(1, Tuning::default(), board);
        s.drain_events();
        s
    }

    fn run_ms(s: &mut GameSession, ms: u64) {
        for _ in 0..ms / 50 {
            tick(s, 50);
        }
    }

    #[test]
    fn test_empty_board_scenario() {
        let mut s = session();
        run_ms(&mut s, 5000);
        assert_eq!(s.matcher.phase, MatchPhase::Idle);
        assert_eq!(s.matcher.first, None);
        assert_eq!(s.matcher.matched, 0);
        assert_eq!(s.matcher.lives, 4);
        assert_eq!(s.matcher.board.face_up_count(), 0);
    }

    #[test]
    fn test_match_pair() {
        let mut s = session();
        assert_eq!(s.flip(2), FlipOutcome::Pending);
        assert_eq!(s.matcher.phase, MatchPhase::OneFlipped);
        assert_eq!(s.flip(3), FlipOutcome::Matched(Toriel));
        assert_eq!(s.matcher.matched, 1);
        assert!(s.matcher.is_locked());
        assert!(s.events.contains(&GameEvent::Play(Sound::TorielVoice)));

        run_ms(&mut s, 500);
        assert_eq!(s.matcher.phase, MatchPhase::Idle);
        assert!(s.matcher.board.cards[2].matched);
        assert!(s.matcher.board.cards[3].matched);
        assert!(s.events.contains(&GameEvent::CardsMatched { first: 2, second: 3 }));

        // Permanently disabled
        assert_eq!(s.flip(2), FlipOutcome::Rejected(Rejection::Matched));
        assert_eq!(s.matcher.matched, 1);
    }

    #[test]
    fn test_mismatch_costs_life_and_unflips() {
        let mut s = session();
        s.flip(0);
        assert_eq!(s.flip(2), FlipOutcome::Mismatched);
        assert_eq!(s.matcher.lives, 3);
        assert_eq!(s.matcher.phase, MatchPhase::Locked);

        run_ms(&mut s, 200);
        assert!(s.matcher.board.cards[0].wrong);
        run_ms(&mut s, 200);
        assert!(!s.matcher.board.cards[0].wrong);
        assert!(s.matcher.board.cards[0].face_up);

        run_ms(&mut s, 100);
        assert_eq!(s.matcher.phase, MatchPhase::Idle);
        assert!(!s.matcher.board.cards[0].face_up);
        assert!(!s.matcher.board.cards[2].face_up);

        let hidden = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::CardsHidden { .. }))
            .count();
        assert_eq!(hidden, 1);
        assert_eq!(s.scheduler.pending(), 0);
    }

    #[test]
    fn test_locked_board_rejects() {
        let mut s = session();
        s.flip(0);
        s.flip(2);
        let lives = s.matcher.lives;
        assert_eq!(s.flip(4), FlipOutcome::Rejected(Rejection::Locked));
        assert_eq!(s.matcher.lives, lives);
        assert_eq!(s.matcher.first, None);
        assert!(!s.matcher.board.cards[4].face_up);
    }

    #[test]
    fn test_rejects_face_up_and_out_of_range() {
        let mut s = session();
        s.flip(0);
        assert_eq!(s.flip(0), FlipOutcome::Rejected(Rejection::AlreadyFaceUp));
        assert_eq!(s.flip(42), FlipOutcome::Rejected(Rejection::OutOfRange));
        assert_eq!(s.matcher.first, Some(0));
    }

    #[test]
    fn test_last_life_is_terminal() {
        let mut s = session();
        for _ in 0..3 {
            s.flip(0);
            assert_eq!(s.flip(2), FlipOutcome::Mismatched);
            run_ms(&mut s, 500);
        }
        s.flip(0);
        assert_eq!(s.flip(2), FlipOutcome::GameOver);
        assert_eq!(s.matcher.lives, 0);
        assert_eq!(s.matcher.phase, MatchPhase::GameOver);
        assert!(s.events.contains(&GameEvent::GameOver));

        run_ms(&mut s, 1000);
        assert_eq!(s.flip(4), FlipOutcome::Rejected(Rejection::NotInProgress));
        assert_eq!(s.matcher.phase, MatchPhase::GameOver);
    }

    #[test]
    fn test_four_pairs_win() {
        let mut s = session();
        for (a, b) in [(0, 1), (2, 3), (4, 5), (6, 7)] {
            s.flip(a);
            s.flip(b);
            run_ms(&mut s, 500);
        }
        assert_eq!(s.matcher.matched, 4);
        assert_eq!(s.matcher.phase, MatchPhase::Won);
        assert_eq!(s.flip(8), FlipOutcome::Rejected(Rejection::NotInProgress));

        let events = s.drain_events();
        assert!(events.contains(&GameEvent::Won));
        run_ms(&mut s, 16_000);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::Play(Sound::Victory)));
        assert!(events.contains(&GameEvent::Navigate));
    }

    #[test]
    fn test_special_triggers_and_locks() {
        let mut s = session();
        assert_eq!(s.flip(8), FlipOutcome::SpecialTriggered);
        assert_eq!(s.matcher.phase, MatchPhase::SpecialTriggered);
        assert!(s.matcher.special_consumed);
        assert_eq!(s.matcher.matched, 0);
        assert_eq!(s.matcher.board.count_face(Flowey), 0);
        assert_eq!(s.matcher.board.count_face(EvilFlowey), 2);
        assert_eq!(s.flip(0), FlipOutcome::Rejected(Rejection::NotInProgress));

        run_ms(&mut s, 9950);
        assert!(s.fight.is_none());
        run_ms(&mut s, 50);
        assert!(s.fight.is_some());
    }

    #[test]
    fn test_armed_flip_plays_effect_then_pairs() {
        let board = Board::from_faces([Papyrus, Papyrus, EvilFlowey, EvilFlowey]);
        let mut s = GameSession::with_board(1, Tuning::default(), board);
        s.drain_events();

        assert_eq!(s.flip(2), FlipOutcome::Pending);
        assert!(s.events.contains(&GameEvent::Play(Sound::Evil)));
        assert_eq!(s.flip(3), FlipOutcome::Matched(EvilFlowey));
        assert!(s.events.contains(&GameEvent::Play(Sound::FloweyFound)));
        assert!(s.fight.is_none());
        assert_eq!(s.matcher.matched, 1);
    }

    proptest! {
        #[test]
        fn locked_board_never_changes(extra in proptest::collection::vec(0usize..12, 1..20)) {
            let mut s = session();
            s.flip(0);
            s.flip(2);
            let lives = s.matcher.lives;
            let matched = s.matcher.matched;
            let board = s.matcher.board.clone();

            for index in extra {
                let outcome = s.flip(index);
                prop_assert!(matches!(outcome, FlipOutcome::Rejected(_)));
            }
            prop_assert_eq!(s.matcher.lives, lives);
            prop_assert_eq!(s.matcher.matched, matched);
            prop_assert_eq!(s.matcher.first, None);
            prop_assert_eq!(&s.matcher.board, &board);
        }

        #[test]
        fn equal_pair_adds_exactly_one(pair in 0usize..4, reversed in any::<bool>()) {
            let mut s = session();
            let (a, b) = if reversed { (pair * 2 + 1, pair * 2) } else { (pair * 2, pair * 2 + 1) };
            s.flip(a);
            s.flip(b);
            run_ms(&mut s, 500);
            prop_assert_eq!(s.matcher.matched, 1);
            prop_assert!(s.matcher.board.cards[a].matched && s.matcher.board.cards[b].matched);
            prop_assert_eq!(s.flip(a), FlipOutcome::Rejected(Rejection::Matched));
        }
    }
}
