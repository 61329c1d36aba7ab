// Time types and clock sources used by the sale window.
//
// IMPORTANT:
// The sale never reads the system clock by itself. Every call that depends on
// time receives a `now` reading taken once by the caller, so a single call
// sees one consistent instant.
//
// SystemClock uses SystemTime::now() which is NON-DETERMINISTIC. Replays,
// simulations and tests must use ManualClock.

use std::cell::Cell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Seconds timestamps used to determine it using its type
pub type TimestampSeconds = u64;

#[inline]
pub fn get_current_time() -> Duration {
    // A clock set before 1970 reads as the epoch
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

// Return timestamp in seconds
pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}

/// Source of the "now" reading taken at the start of each call
pub trait Clock {
    fn now(&self) -> TimestampSeconds;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimestampSeconds {
        get_current_time_in_seconds()
    }
}

/// Manually driven clock for replays and tests
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<TimestampSeconds>,
}

impl ManualClock {
    pub fn new(now: TimestampSeconds) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: TimestampSeconds) {
        self.now.set(now);
    }

    /// Move the clock forward, saturating at u64::MAX
    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get().saturating_add(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimestampSeconds {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> TimestampSeconds {
        (**self).now()
    }
}
