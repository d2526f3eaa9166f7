//! Time sources for tick pacing.
//!
//! [`TickPacer`](crate::engine::pacing::TickPacer) never reads the system time
//! directly. It goes through a [`Clock`], so a run can be paced by the real
//! monotonic clock ([`SystemClock`]) or by a [`ManualClock`] that only moves
//! when told to (tests, deterministic replays of a fixed number of frames).

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source that can also put the caller to sleep.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only advances through [`ManualClock::advance`] or `sleep`.
///
/// Clones share the same time, so a test can keep one clone and hand another
/// to the engine.
#[derive(Debug, Clone)]
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
        ManualClock {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    /// Sleeping on a manual clock returns at once with the time moved forward.
    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
