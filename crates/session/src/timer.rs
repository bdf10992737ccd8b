//! One-shot timer scheduling behind a trait.
//!
//! Auto-logout and short-lived-token expiry are the only background-triggered
//! transitions in the core. Each scheduled timer gets a unique [`TimerId`];
//! the controller that scheduled it keeps the id and ignores any fire that no
//! longer matches, so a stale timer can never act on superseded state.

use std::cell::{Cell, RefCell};

use chrono::{DateTime, Utc};

/// Opaque identity of a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// One-shot timer scheduler.
///
/// Implementations clamp past deadlines to "due immediately"; the effective
/// delay is `max(fire_at - now, 0)`. UI event loops adapt their own timer
/// facility behind this trait; [`ManualTimers`] is the deterministic
/// reference implementation used by tests and simulations.
pub trait TimerScheduler {
    /// Schedule a one-shot timer due at `fire_at`.
    fn schedule(&self, fire_at: DateTime<Utc>) -> TimerId;

    /// Cancel a pending timer. Cancelling an already-fired or unknown id is a
    /// no-op.
    fn cancel(&self, id: TimerId);
}

/// Deterministic scheduler: timers fire when the driver calls
/// [`ManualTimers::fire_due`] with a clock reading at or past their deadline.
#[derive(Debug, Default)]
pub struct ManualTimers {
    next_id: Cell<u64>,
    pending: RefCell<Vec<(TimerId, DateTime<Utc>)>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all timers due at `now`, soonest first.
    pub fn fire_due(&self, now: DateTime<Utc>) -> Vec<TimerId> {
        let mut pending = self.pending.borrow_mut();
        let mut due: Vec<(TimerId, DateTime<Utc>)> = Vec::new();

        pending.retain(|entry| {
            if entry.1 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });

        due.sort_by_key(|entry| entry.1);
        due.into_iter().map(|entry| entry.0).collect()
    }

    /// Deadline of the soonest pending timer, if any.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.borrow().iter().map(|entry| entry.1).min()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl TimerScheduler for ManualTimers {
    fn schedule(&self, fire_at: DateTime<Utc>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.pending.borrow_mut().push((id, fire_at));
        id
    }

    fn cancel(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|entry| entry.0 != id);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn fires_only_due_timers_in_deadline_order() {
        let timers = ManualTimers::new();
        let late = timers.schedule(at(3_000));
        let early = timers.schedule(at(1_000));
        let _future = timers.schedule(at(10_000));

        assert_eq!(timers.fire_due(at(5_000)), vec![early, late]);
        assert_eq!(timers.pending_count(), 1);
    }

    #[test]
    fn deadline_is_inclusive() {
        let timers = ManualTimers::new();
        let id = timers.schedule(at(2_000));
        assert!(timers.fire_due(at(1_999)).is_empty());
        assert_eq!(timers.fire_due(at(2_000)), vec![id]);
    }

    #[test]
    fn cancel_removes_pending_and_tolerates_unknown_ids() {
        let timers = ManualTimers::new();
        let id = timers.schedule(at(1_000));
        timers.cancel(id);
        assert!(timers.fire_due(at(2_000)).is_empty());

        // Cancelling again is a no-op.
        timers.cancel(id);
    }

    #[test]
    fn ids_are_unique_across_cancellation() {
        let timers = ManualTimers::new();
        let a = timers.schedule(at(1));
        timers.cancel(a);
        let b = timers.schedule(at(1));
        assert_ne!(a, b);
    }
}
