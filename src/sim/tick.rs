//! Per-frame session update
//!
//! Each tick runs three stages in a fixed order:
//! 1. queued input (flips, direction presses)
//! 2. scheduler steps due within the frame, earliest first
//! 3. the fight's per-frame step, if a fight is active

use super::state::{GameEvent, GameSession, InputEvent, Step};
use crate::consts::MAX_FRAME_MS;

/// Advance the session by one display frame of `dt_ms` milliseconds
pub fn tick(session: &mut GameSession, dt_ms: u64) {
    // Cap long frames (tab switches, debugger pauses) so timers don't burst
    let dt_ms = dt_ms.min(MAX_FRAME_MS);

    while let Some(input) = session.inputs.pop_front() {
        apply_input(session, input);
    }

    let until = session.scheduler.now() + dt_ms;
    while let Some((_, step)) = session.scheduler.pop_due(until) {
        run_step(session, step);
    }
    session.scheduler.advance_to(until);

    session.fight_frame();
    session.frame_count += 1;
}

fn apply_input(session: &mut GameSession, input: InputEvent) {
    match input {
        InputEvent::Flip(index) => {
            session.flip(index);
        }
        InputEvent::Press(dir) | InputEvent::Release(dir) => {
            let held = matches!(input, InputEvent::Press(_));
            match session.fight.as_mut() {
                Some(fight) if fight.is_running() => fight.held.set(dir, held),
                _ => log::debug!("Ignoring {:?} outside a fight", input),
            }
        }
    }
}

fn run_step(session: &mut GameSession, step: Step) {
    match step {
        Step::Emit(event) => session.events.push(event),
        Step::RevealMatch { first, second } => session.reveal_match(first, second),
        Step::WrongFlash { first, second, lit } => session.flash_wrong(first, second, lit),
        Step::Unflip { first, second } => session.unflip(first, second),
        Step::BeginFight => session.begin_fight(),
        Step::ArmFight => session.arm_fight(),
        Step::SpawnBullet => session.spawn_tick(),
        Step::CountdownTick => session.countdown_tick(),
        Step::ResumeMatching => session.resume_matching(),
        Step::Navigate => session.events.push(GameEvent::Navigate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::card::{Board, Character};
    use crate::sim::entity::Direction;
    use crate::tuning::Tuning;

    #[test]
    fn test_inputs_drain_in_order() {
        let board = Board::from_faces([Character::Sans, Character::Sans]);
        let mut s = GameSession::with_board(5, Tuning::default(), board);
        s.push_input(InputEvent::Flip(0));
        s.push_input(InputEvent::Flip(1));
        tick(&mut s, 16);
        assert_eq!(s.matcher.matched, 1);
        assert!(s.inputs.is_empty());
        assert_eq!(s.frame_count, 1);
    }

    #[test]
    fn test_direction_ignored_outside_fight() {
        let mut s = GameSession::new(5, Tuning::default());
        s.push_input(InputEvent::Press(Direction::Up));
        tick(&mut s, 16);
        assert!(s.fight.is_none());
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut s = GameSession::new(5, Tuning::default());
        tick(&mut s, 60_000);
        assert_eq!(s.scheduler.now(), MAX_FRAME_MS);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameSession::new(99_999, Tuning::default());
        let mut b = GameSession::new(99_999, Tuning::default());
        let special = a
            .matcher
            .board
            .cards
            .iter()
            .position(|c| c.face == Character::Flowey)
            .unwrap();

        for s in [&mut a, &mut b] {
            s.push_input(InputEvent::Flip(special));
            for frame in 0..1200u32 {
                if frame == 1000 {
                    s.push_input(InputEvent::Press(Direction::Left));
                }
                tick(s, 16);
            }
        }

        assert_eq!(a.events, b.events);
        let (fa, fb) = (a.fight.unwrap(), b.fight.unwrap());
        assert_eq!(fa.player.pos, fb.player.pos);
        assert_eq!(fa.bullets.len(), fb.bullets.len());
        for (x, y) in fa.bullets.iter().zip(&fb.bullets) {
            assert_eq!(x.pos, y.pos);
        }
    }
}
