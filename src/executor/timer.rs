//! Periodic trigger-and-reset timer.

use std::time::{Duration, Instant};

use crate::time::{Clock, Deadline, SystemClock};

/// Fires at most once per period.
///
/// Each firing re-arms the timer relative to the time it was observed, so a
/// loop that falls behind sees later triggers instead of a burst of
/// catch-up firings.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use sourced_rpc::{ManualClock, Timer};
///
/// let clock = ManualClock::new();
/// let mut timer = Timer::with_clock(Duration::from_millis(100), clock.clone());
///
/// assert!(!timer.is_triggered_and_reset());
/// clock.advance(Duration::from_millis(100));
/// assert!(timer.is_triggered_and_reset());
/// assert!(!timer.is_triggered_and_reset());
/// ```
#[derive(Clone, Debug)]
pub struct Timer<C: Clock = SystemClock> {
    period: Duration,
    /// `Never` when `period` is too long to represent.
    next_trigger: Deadline,
    clock: C,
}

impl Timer<SystemClock> {
    pub fn new(period: Duration) -> Self {
        Self::with_clock(period, SystemClock)
    }
}

impl<C: Clock> Timer<C> {
    pub fn with_clock(period: Duration, clock: C) -> Self {
        let next_trigger = rearm(clock.now(), period);
        Self {
            period,
            next_trigger,
            clock,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// `true` once the period has elapsed; re-arms to `now + period`.
    pub fn is_triggered_and_reset(&mut self) -> bool {
        let now = self.clock.now();
        if !self.next_trigger.has_passed(now) {
            return false;
        }
        self.next_trigger = rearm(now, self.period);
        true
    }

    pub fn next_trigger(&self) -> Deadline {
        self.next_trigger
    }
}

fn rearm(now: Instant, period: Duration) -> Deadline {
    now.checked_add(period).map_or(Deadline::Never, Deadline::At)
}
