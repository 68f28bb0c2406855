//! Virtual-clock timer queue
//!
//! The game is driven entirely by one-shot timers scheduled "after N ms".
//! Timers fire in due order, and in insertion order when due times tie.
//! A timer may carry a `CancelToken`; cancelled timers are dropped unfired.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Callbacks the game schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// One simulation step of the running game
    GameTick,
    /// One-second countdown toward the next speed increase
    SpeedTimer,
    /// Start the next life after the post-loss pause
    NewRound,
}

/// Shared cancellation flag (single-threaded)
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug)]
struct Pending {
    timer: Timer,
    token: Option<CancelToken>,
}

impl Pending {
    fn is_live(&self) -> bool {
        !self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Ordered queue of pending timers plus the current virtual time
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    fn push(&mut self, delay_ms: u64, timer: Timer, token: Option<CancelToken>) {
        let key = (self.now_ms + delay_ms, self.seq);
        self.seq += 1;
        self.queue.insert(key, Pending { timer, token });
    }

    /// Schedule `timer` to fire `delay_ms` from now
    pub fn after(&mut self, delay_ms: u64, timer: Timer) {
        self.push(delay_ms, timer, None);
    }

    /// Schedule `timer`, skipping it if `token` is cancelled before it fires
    pub fn after_with_token(&mut self, delay_ms: u64, timer: Timer, token: &CancelToken) {
        self.push(delay_ms, timer, Some(token.clone()));
    }

    /// Drop entries whose token has been cancelled
    fn purge_cancelled(&mut self) {
        self.queue.retain(|_, p| p.is_live());
    }

    /// Due time of the next live timer
    pub fn next_due(&mut self) -> Option<u64> {
        self.purge_cancelled();
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the next live timer due at or before `deadline`, advancing the
    /// clock to its due time
    pub fn pop_due(&mut self, deadline: u64) -> Option<Timer> {
        while let Some(entry) = self.queue.first_entry() {
            let (due, _) = *entry.key();
            if due > deadline {
                return None;
            }
            let pending = entry.remove();
            if !pending.is_live() {
                continue;
            }
            self.now_ms = self.now_ms.max(due);
            return Some(pending.timer);
        }
        None
    }

    /// Move the clock forward (never backward)
    pub fn advance_to(&mut self, time_ms: u64) {
        self.now_ms = self.now_ms.max(time_ms);
    }

    /// Number of live pending timers
    pub fn pending(&self) -> usize {
        self.queue.values().filter(|p| p.is_live()).count()
    }

    /// Whether a live timer of this kind is queued
    pub fn is_scheduled(&self, timer: Timer) -> bool {
        self.queue
            .values()
            .any(|p| p.timer == timer && p.is_live())
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut sched = Scheduler::new();
        sched.after(1000, Timer::SpeedTimer);
        sched.after(50, Timer::GameTick);

        assert_eq!(sched.next_due(), Some(50));
        assert_eq!(sched.pop_due(2000), Some(Timer::GameTick));
        assert_eq!(sched.now(), 50);
        assert_eq!(sched.pop_due(2000), Some(Timer::SpeedTimer));
        assert_eq!(sched.now(), 1000);
        assert_eq!(sched.pop_due(2000), None);
    }

    #[test]
    fn test_ties_fire_in_insertion_order() {
        let mut sched = Scheduler::new();
        sched.after(100, Timer::NewRound);
        sched.after(100, Timer::GameTick);
        assert_eq!(sched.pop_due(100), Some(Timer::NewRound));
        assert_eq!(sched.pop_due(100), Some(Timer::GameTick));
    }

    #[test]
    fn test_respects_deadline() {
        let mut sched = Scheduler::new();
        sched.after(500, Timer::GameTick);
        assert_eq!(sched.pop_due(499), None);
        assert_eq!(sched.now(), 0);
        sched.advance_to(499);
        assert_eq!(sched.pop_due(500), Some(Timer::GameTick));
    }

    #[test]
    fn test_delays_are_relative_to_now() {
        let mut sched = Scheduler::new();
        sched.advance_to(1_000);
        sched.after(50, Timer::GameTick);
        assert_eq!(sched.next_due(), Some(1_050));
        // Clock never runs backward
        sched.advance_to(10);
        assert_eq!(sched.now(), 1_000);
    }

    #[test]
    fn test_cancelled_timers_never_fire() {
        let mut sched = Scheduler::new();
        let token = CancelToken::new();
        sched.after_with_token(1000, Timer::SpeedTimer, &token);
        sched.after(2000, Timer::GameTick);
        assert!(sched.is_scheduled(Timer::SpeedTimer));
        assert_eq!(sched.pending(), 2);

        token.cancel();
        assert!(!sched.is_scheduled(Timer::SpeedTimer));
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.pop_due(5000), Some(Timer::GameTick));
        assert!(sched.is_idle());
    }
}
