//! Deadlines and clocks shared by the transport, the event loop and timers.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// The next point in time something needs attention.
///
/// Ordered so that any `At(_)` is earlier than `Never`, which makes
/// `a.min(b)` the natural way to combine deadlines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Deadline {
    At(Instant),
    Never,
}

impl Deadline {
    /// A deadline that has already been reached: waiting on it never blocks.
    pub fn now() -> Self {
        Deadline::At(Instant::now())
    }

    pub fn after(duration: Duration) -> Self {
        Instant::now()
            .checked_add(duration)
            .map_or(Deadline::Never, Deadline::At)
    }

    pub fn has_passed(&self, now: Instant) -> bool {
        match self {
            Deadline::At(at) => *at <= now,
            Deadline::Never => false,
        }
    }

    /// Time left until the deadline, `None` when it never expires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self {
            Deadline::At(at) => Some(at.saturating_duration_since(now)),
            Deadline::Never => None,
        }
    }

    pub fn instant(&self) -> Option<Instant> {
        match self {
            Deadline::At(at) => Some(*at),
            Deadline::Never => None,
        }
    }
}

impl From<Instant> for Deadline {
    fn from(at: Instant) -> Self {
        Deadline::At(at)
    }
}

/// Time source for timers.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Instant) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
