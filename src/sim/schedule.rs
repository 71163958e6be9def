//! Simulated-clock scheduler
//!
//! One-shot, repeating, and scripted timers on a single millisecond clock.
//! Nothing fires on its own: the owner pulls due steps with [`Scheduler::pop_due`]
//! and runs each to completion before pulling the next, so a step may cancel
//! timers that were due in the same instant.

use serde::{Deserialize, Serialize};

/// Handle returned when a timer is scheduled
pub type TimerId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer<T> {
    id: TimerId,
    due_ms: u64,
    /// `Some` for repeating timers
    period_ms: Option<u64>,
    step: T,
}

/// Timer queue ordered by (due time, creation order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    now_ms: u64,
    timers: Vec<Timer<T>>,
    next_id: TimerId,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    fn push(&mut self, due_ms: u64, period_ms: Option<u64>, step: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
            step,
        });
        id
    }

    /// Run `step` once after `delay_ms`
    pub fn after(&mut self, delay_ms: u64, step: T) -> TimerId {
        self.push(self.now_ms + delay_ms, None, step)
    }

    /// Run `step` every `period_ms`, first firing one period from now
    pub fn every(&mut self, period_ms: u64, step: T) -> TimerId {
        // A zero period would never let the clock advance
        let period_ms = period_ms.max(1);
        self.push(self.now_ms + period_ms, Some(period_ms), step)
    }

    /// Schedule a timeline of `(delay from now, step)` pairs
    pub fn script(&mut self, steps: impl IntoIterator<Item = (u64, T)>) -> Vec<TimerId> {
        steps
            .into_iter()
            .map(|(delay_ms, step)| self.after(delay_ms, step))
            .collect()
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest step due at or before `until_ms`.
    ///
    /// The clock moves to the step's due time. Repeating timers are
    /// rescheduled one period later before the step is handed out.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let due_ms = self.timers[idx].due_ms;
        self.now_ms = self.now_ms.max(due_ms);

        let timer = &mut self.timers[idx];
        let fired = (timer.id, timer.step.clone());
        match timer.period_ms {
            Some(period) => timer.due_ms += period,
            None => {
                self.timers.remove(idx);
            }
        }
        Some(fired)
    }

    /// Move the clock forward once every due step has been drained
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
