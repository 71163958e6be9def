//! Survive-the-bullets fight controller
//!
//! Pending (overlay up, waiting to arm) -> Active (spawner, countdown and
//! per-frame step running) -> Success or Failed. Teardown happens exactly
//! once per fight: it takes the timer handles, so a second call finds
//! nothing to cancel and reports `false`.

use serde::{Deserialize, Serialize};

use super::collision::first_hit;
use super::entity::{Bullet, HeldDirections, Player, advance_bullets};
use super::schedule::{Scheduler, TimerId};
use super::spawner::spawn_bullet;
use super::state::{GameEvent, GameSession, Sound, Step};
use crate::tuning::FightTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightPhase {
    /// Overlay shown, bullets not yet flying
    Pending,
    Active,
    /// Countdown reached zero
    Success,
    /// Player was hit
    Failed,
}

/// State of one fight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightSession {
    pub phase: FightPhase,
    pub player: Player,
    /// Live bullets in spawn order
    pub bullets: Vec<Bullet>,
    pub remaining_secs: u32,
    pub held: HeldDirections,
    /// Bullets spawned over the whole fight
    pub spawned: u32,
    /// Number of times teardown actually ran (0 or 1)
    pub teardowns: u32,
    spawn_timer: Option<TimerId>,
    countdown_timer: Option<TimerId>,
    next_bullet_id: u32,
}

impl FightSession {
    pub fn new(tuning: &FightTuning) -> Self {
        Self {
            phase: FightPhase::Pending,
            player: Player::new(tuning.player_start, tuning.player_size),
            bullets: Vec::new(),
            remaining_secs: tuning.duration_secs,
            held: HeldDirections::default(),
            spawned: 0,
            teardowns: 0,
            spawn_timer: None,
            countdown_timer: None,
            next_bullet_id: 1,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == FightPhase::Active
    }

    /// Still accepting input (Pending or Active)
    pub fn is_running(&self) -> bool {
        matches!(self.phase, FightPhase::Pending | FightPhase::Active)
    }

    /// True while either periodic timer is still owned by this fight
    pub fn has_live_timers(&self) -> bool {
        self.spawn_timer.is_some() || self.countdown_timer.is_some()
    }

    /// Enter `Active`: reset the player and clock, start countdown then spawner
    pub fn arm(&mut self, tuning: &FightTuning, scheduler: &mut Scheduler<Step>) -> bool {
        if self.phase != FightPhase::Pending {
            return false;
        }
        self.phase = FightPhase::Active;
        self.player = Player::new(tuning.player_start, tuning.player_size);
        self.remaining_secs = tuning.duration_secs;
        self.bullets.clear();
        self.countdown_timer = Some(scheduler.every(tuning.countdown_period_ms, Step::CountdownTick));
        self.spawn_timer = Some(scheduler.every(tuning.spawn_period_ms, Step::SpawnBullet));
        true
    }

    pub fn next_bullet_id(&mut self) -> u32 {
        let id = self.next_bullet_id;
        self.next_bullet_id += 1;
        id
    }

    /// One display frame: input movement, bullet motion, then collision.
    ///
    /// Returns the id of the bullet that hit the player, if any.
    pub fn step(&mut self, tuning: &FightTuning) -> Option<u32> {
        if !self.is_active() {
            return None;
        }
        let arena = tuning.arena_size();
        self.player.advance(&self.held, tuning.move_speed, arena);
        advance_bullets(&mut self.bullets, arena, tuning.despawn_margin);
        first_hit(&self.player, &self.bullets, tuning.bullet_size)
    }

    /// Stop everything and move to `outcome`.
    ///
    /// Returns false (and does nothing) if the fight already ended.
    pub fn teardown(&mut self, scheduler: &mut Scheduler<Step>, outcome: FightPhase) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = outcome;
        if let Some(id) = self.countdown_timer.take() {
            scheduler.cancel(id);
        }
        if let Some(id) = self.spawn_timer.take() {
            scheduler.cancel(id);
        }
        self.bullets.clear();
        self.held.clear();
        self.teardowns += 1;
        true
    }
}

impl GameSession {
    /// Hand-off from the special-card timeline
    pub(crate) fn begin_fight(&mut self) {
        if self.fight.is_some() || !self.matcher.special_consumed || self.matcher.is_terminal() {
            return;
        }
        let fight = FightSession::new(&self.tuning.fight);
        self.events.push(GameEvent::FightOverlay { visible: true });
        self.events.push(GameEvent::Countdown {
            remaining: fight.remaining_secs,
        });
        self.fight = Some(fight);
        self.scheduler.after(self.tuning.timeline.fight_arm_ms, Step::ArmFight);
        log::info!("Fight pending, arming in {} ms", self.tuning.timeline.fight_arm_ms);
    }

    pub(crate) fn arm_fight(&mut self) {
        let Some(fight) = self.fight.as_mut() else {
            return;
        };
        if fight.arm(&self.tuning.fight, &mut self.scheduler) {
            self.events.push(GameEvent::FightStarted);
            log::info!("Fight armed: survive {} s", fight.remaining_secs);
        }
    }

    pub(crate) fn spawn_tick(&mut self) {
        let Some(fight) = self.fight.as_mut() else {
            return;
        };
        if !fight.is_active() {
            return;
        }
        let id = fight.next_bullet_id();
        let bullet = spawn_bullet(&mut self.rng, id, &self.tuning.fight);
        fight.bullets.push(bullet);
        fight.spawned += 1;
    }

    pub(crate) fn countdown_tick(&mut self) {
        let Some(fight) = self.fight.as_mut() else {
            return;
        };
        if !fight.is_active() {
            return;
        }
        fight.remaining_secs = fight.remaining_secs.saturating_sub(1);
        let remaining = fight.remaining_secs;
        self.events.push(GameEvent::Countdown { remaining });
        if remaining == 0 {
            self.end_fight(FightPhase::Success);
        }
    }

    /// Per-frame fight update; no-op unless the fight is active
    pub(crate) fn fight_frame(&mut self) {
        let Some(fight) = self.fight.as_mut() else {
            return;
        };
        if let Some(bullet) = fight.step(&self.tuning.fight) {
            log::info!("Player hit by bullet {}", bullet);
            self.end_fight(FightPhase::Failed);
        }
    }

    /// Terminal transition; repeated calls after the first are ignored
    pub(crate) fn end_fight(&mut self, outcome: FightPhase) {
        let Some(fight) = self.fight.as_mut() else {
            return;
        };
        if !fight.teardown(&mut self.scheduler, outcome) {
            return;
        }

        match outcome {
            FightPhase::Success => {
                self.events.push(GameEvent::Play(Sound::Survived));
                self.events.push(GameEvent::FightSurvived);
                self.scheduler.after(
                    self.tuning.timeline.survived_return_ms,
                    Step::ResumeMatching,
                );
                log::info!("Fight survived ({} bullets)", fight.spawned);
            }
            _ => {
                self.events.push(GameEvent::Stop(Sound::Wind));
                self.events.push(GameEvent::FightOverlay { visible: false });
                self.events.push(GameEvent::FightLost);
                self.game_over();
            }
        }
    }

    /// Close the overlay after a survived fight and reopen the board
    pub(crate) fn resume_matching(&mut self) {
        if !self
            .fight
            .as_ref()
            .is_some_and(|f| f.phase == FightPhase::Success)
        {
            return;
        }
        self.fight = None;
        self.events.push(GameEvent::FightOverlay { visible: false });

        if let Some(index) = self.matcher.armed {
            match self.matcher.board.get_mut(index) {
                Some(card) if card.face_up => {
                    card.face_up = false;
                    self.events.push(GameEvent::CardHidden { index });
                }
                _ => {}
            }
        }
        self.matcher.settle();
        log::info!("Matching resumed");
    }
}
