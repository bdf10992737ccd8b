//! Injectable wall-clock abstraction.
//!
//! Controllers never read the system time directly; they hold a [`Clock`] so
//! expiry logic is deterministic under test.

use std::cell::Cell;

use chrono::{DateTime, TimeZone, Utc};

/// Source of "now" for expiry comparisons and timer deadlines.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock (production default).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests and simulations.
///
/// Interior mutability on purpose: the clock is shared between the test
/// driver and the controller under test (single-threaded, so a `Cell` is
/// enough).
#[derive(Debug)]
pub struct ManualClock {
    millis: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: Cell::new(start_millis),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.set(millis);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.set(self.millis.get() + delta);
    }

    pub fn millis(&self) -> i64 {
        self.millis.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.get())
            .single()
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
