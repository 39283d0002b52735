//! Cooperative, single-threaded event loop.
//!
//! One cycle of the loop:
//!
//! ```text
//!   ┌─► drain()            process every unit of ready transport work
//!   │     │                (data-available callbacks, peer notifications)
//!   │     ▼
//!   │   hook()             application work, e.g. a Timer sending requests;
//!   │     │                returns the application's next deadline
//!   │     ▼
//!   │   run_until(min(transport.next_work_timepoint(), app deadline))
//!   └─────┘                block until the deadline or new work arrives
//! ```

mod timer;

use std::ops::ControlFlow;

use log::trace;

use crate::time::Deadline;
use crate::transport::Transport;

pub use timer::Timer;

/// Drives a [`Transport`] on the current thread.
///
/// Every callback and handler runs inside [`drain`](EventLoop::drain) or
/// [`run_until`](EventLoop::run_until), strictly one at a time.
pub struct EventLoop<T: Transport> {
    transport: T,
}

impl<T: Transport> EventLoop<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Process work until none is immediately available, without blocking.
    ///
    /// Returns the number of units processed.
    pub fn drain(&self) -> usize {
        let mut units = 0;
        while self.transport.has_pending_work() {
            self.transport.spin(Deadline::now());
            units += 1;
        }
        if units > 0 {
            trace!("drained {} units of work", units);
        }
        units
    }

    /// Block until `deadline` or until new work arrives, processing at most
    /// one unit. Call [`drain`](EventLoop::drain) afterwards for the rest.
    pub fn run_until(&self, deadline: Deadline) {
        self.transport.spin(deadline);
    }

    /// The earlier of the transport's next wake time and `app_deadline`.
    pub fn next_deadline(&self, app_deadline: Deadline) -> Deadline {
        self.transport.next_work_timepoint().min(app_deadline)
    }

    /// One full cycle: drain, call `hook`, then wait for the combined deadline.
    pub fn run_once<F>(&self, hook: F) -> ControlFlow<()>
    where
        F: FnOnce() -> ControlFlow<(), Deadline>,
    {
        self.drain();
        let app_deadline = hook()?;
        self.run_until(self.next_deadline(app_deadline));
        ControlFlow::Continue(())
    }

    /// Cycle until `hook` returns `ControlFlow::Break`.
    ///
    /// `hook` runs once per cycle after draining and returns the next time the
    /// application needs to run (`Deadline::Never` when it only reacts to
    /// transport events).
    pub fn run_while<F>(&self, mut hook: F)
    where
        F: FnMut() -> ControlFlow<(), Deadline>,
    {
        while self.run_once(&mut hook).is_continue() {}
    }

    /// Cycle forever. There is no shutdown signal.
    pub fn run<F>(&self, mut hook: F) -> !
    where
        F: FnMut() -> Deadline,
    {
        loop {
            self.drain();
            let app_deadline = hook();
            self.run_until(self.next_deadline(app_deadline));
        }
    }
}
