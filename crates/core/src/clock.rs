//! Time source for transaction timestamps.
//!
//! Windowed screening rules compare creation timestamps, so the service takes its
//! clock by injection instead of calling `Utc::now()` directly.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Every call to [`Clock::now`] returns the current instant and then advances
/// it by the configured step, so consecutive transactions get distinct,
/// predictable timestamps.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    step: Duration,
}

impl ManualClock {
    /// Creates a clock frozen at `start` that advances by `step` on every read.
    #[must_use]
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            state: Mutex::new(ManualState { now: start, step }),
        }
    }

    /// Moves the clock forward without reading it.
    pub fn advance(&self, by: Duration) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.now += by;
    }

    /// Changes the per-read step.
    pub fn set_step(&self, step: Duration) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.step = step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        // A poisoned clock still holds a valid instant.
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = state.now;
        let step = state.step;
        state.now += step;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_steps_on_read() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start, Duration::seconds(10));

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::seconds(10));

        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), start + Duration::seconds(320));
    }

    #[test]
    fn test_manual_clock_zero_step_is_frozen() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start, Duration::zero());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }
}
