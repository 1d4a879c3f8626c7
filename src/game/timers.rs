//! Cancellable deferred continuations keyed by actor and purpose

use std::collections::HashMap;
use std::time::Duration;

use crate::replication::ActorId;
use crate::ws::protocol::WeaponSlot;

/// What a timer continues when it expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Single-shot weapon cooldown
    Cooldown(WeaponSlot),
    /// Next automatic-fire tick
    Cadence,
    /// Magazine refill
    Reload(WeaponSlot),
    /// Host-side respawn after death
    Respawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub actor: ActorId,
    pub purpose: TimerPurpose,
}

impl TimerKey {
    pub fn new(actor: ActorId, purpose: TimerPurpose) -> Self {
        Self { actor, purpose }
    }
}

/// A timer that has fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired {
    pub key: TimerKey,
    /// When it was due, not when it was popped
    pub deadline: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    deadline: Duration,
    order: u64,
}

/// Arena of pending timers on a simulation clock.
///
/// At most one timer exists per key; scheduling an existing key replaces it.
/// Expired timers are handed out one at a time so a continuation can cancel a
/// timer that is due in the same tick before it is popped.
#[derive(Debug, Default)]
pub struct TimerArena {
    now: Duration,
    next_order: u64,
    pending: HashMap<TimerKey, Scheduled>,
}

impl TimerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation time since the arena was created
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    pub fn schedule(&mut self, key: TimerKey, delay: Duration) {
        self.schedule_at(key, self.now + delay);
    }

    pub fn schedule_at(&mut self, key: TimerKey, deadline: Duration) {
        let order = self.next_order;
        self.next_order += 1;
        self.pending.insert(key, Scheduled { deadline, order });
    }

    /// Cancel a timer. Safe to call on keys that are not pending.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    /// Cancel every timer of `actor` whose purpose matches
    pub fn cancel_where(&mut self, actor: ActorId, mut pred: impl FnMut(TimerPurpose) -> bool) {
        self.pending
            .retain(|key, _| key.actor != actor || !pred(key.purpose));
    }

    pub fn cancel_actor(&mut self, actor: ActorId) {
        self.cancel_where(actor, |_| true);
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// Time left before `key` fires
    pub fn remaining(&self, key: TimerKey) -> Option<Duration> {
        self.pending
            .get(&key)
            .map(|s| s.deadline.saturating_sub(self.now))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the earliest due timer, if any
    pub fn pop_due(&mut self) -> Option<Expired> {
        let (key, scheduled) = self
            .pending
            .iter()
            .filter(|(_, s)| s.deadline <= self.now)
            .min_by_key(|(_, s)| (s.deadline, s.order))
            .map(|(k, s)| (*k, *s))?;
        self.pending.remove(&key);
        Some(Expired {
            key,
            deadline: scheduled.deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(actor: u64, purpose: TimerPurpose) -> TimerKey {
        TimerKey::new(ActorId(actor), purpose)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut timers = TimerArena::new();
        timers.schedule(key(1, TimerPurpose::Respawn), Duration::from_millis(300));
        timers.schedule(key(2, TimerPurpose::Cadence), Duration::from_millis(100));
        timers.advance(Duration::from_millis(500));

        assert_eq!(timers.pop_due().unwrap().key, key(2, TimerPurpose::Cadence));
        assert_eq!(timers.pop_due().unwrap().key, key(1, TimerPurpose::Respawn));
        assert!(timers.pop_due().is_none());
    }

    #[test]
    fn test_not_due_before_deadline() {
        let mut timers = TimerArena::new();
        let k = key(1, TimerPurpose::Reload(WeaponSlot::Primary));
        timers.schedule(k, Duration::from_millis(1500));
        timers.advance(Duration::from_millis(1490));
        assert!(timers.pop_due().is_none());
        assert_eq!(timers.remaining(k), Some(Duration::from_millis(10)));
        timers.advance(Duration::from_millis(10));
        assert_eq!(timers.pop_due().map(|e| e.key), Some(k));
    }

    #[test]
    fn test_cancel_wins_over_expiry() {
        let mut timers = TimerArena::new();
        let reload = key(1, TimerPurpose::Reload(WeaponSlot::Primary));
        timers.schedule(reload, Duration::from_millis(10));
        timers.advance(Duration::from_millis(20));

        assert!(timers.cancel(reload));
        assert!(!timers.cancel(reload));
        assert!(timers.pop_due().is_none());
    }

    #[test]
    fn test_cancel_where_only_touches_one_actor() {
        let mut timers = TimerArena::new();
        timers.schedule(key(1, TimerPurpose::Cadence), Duration::from_secs(1));
        timers.schedule(key(1, TimerPurpose::Respawn), Duration::from_secs(1));
        timers.schedule(key(2, TimerPurpose::Cadence), Duration::from_secs(1));

        timers.cancel_where(ActorId(1), |p| p == TimerPurpose::Cadence);
        assert!(timers.is_pending(key(1, TimerPurpose::Respawn)));
        assert!(timers.is_pending(key(2, TimerPurpose::Cadence)));
        assert_eq!(timers.len(), 2);

        timers.cancel_actor(ActorId(1));
        assert_eq!(timers.len(), 1);
    }
}
