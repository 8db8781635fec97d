//! Single-threaded timer queue
//!
//! Every "later" in the session (spawn interval, settle delay, blink, red
//! transition, message stagger, sprinkle steps) is a timer here. Timers fire
//! in (due time, creation order) order, so two sessions fed the same clock
//! behave identically.

use serde::{Deserialize, Serialize};

/// Identifies a scheduled timer for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due_ms: f64,
    /// Recurring timers re-arm with this period after firing
    period_ms: Option<f64>,
    task: T,
}

/// Ordered collection of one-shot and recurring timers carrying tasks of type `T`
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    timers: Vec<Timer<T>>,
    next_id: u64,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, due_ms: f64, period_ms: Option<f64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
            task,
        });
        id
    }

    /// Fire `task` once at `due_ms`
    pub fn once(&mut self, due_ms: f64, task: T) -> TimerId {
        self.push(due_ms, None, task)
    }

    /// Fire `task` at `first_ms` and then every `period_ms` until cancelled.
    /// Periods below 1 ms are clamped so a recurring timer cannot starve the queue.
    pub fn every(&mut self, first_ms: f64, period_ms: f64, task: T) -> TimerId {
        self.push(first_ms, Some(period_ms.max(1.0)), task)
    }

    /// Returns true if the timer was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<T: Clone> Timeline<T> {
    /// Pop the earliest timer due at or before `now_ms`.
    /// Returns the timer's id, its scheduled time and its task; recurring timers are re-armed.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerId, f64, T)> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;

        let timer = &self.timers[idx];
        let fired = (timer.id, timer.due_ms, timer.task.clone());
        let period = timer.period_ms;
        match period {
            Some(period) => self.timers[idx].due_ms += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(fired)
    }
}
