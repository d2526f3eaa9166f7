//! Fixed-cadence tick production.
//!
//! [`TickPacer`] is the producer of `engine.tick`. It remembers when the
//! current tick period started and on every feed compares that with the
//! clock:
//!
//! 1. At least one period elapsed: emit one tick per elapsed period, capped at
//!    `max_consecutive_ticks`, and restart the period at `now`. The cap keeps a
//!    long stall (debugger, swap storm) from turning into a burst of frames.
//! 2. Less than a period elapsed and blocking allowed: sleep for the rest of
//!    the period, emit exactly one tick, and move the period start forward by
//!    exactly one period so oversleeping does not accumulate as drift.
//! 3. Otherwise emit nothing.

use std::time::{Duration, Instant};

use log::{trace, warn};

use crate::clock::Clock;
use crate::dispatcher::EventDispatcher;
use crate::events::PhaseEvent;
use crate::producers::Producer;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(16);
pub const MAX_CONSECUTIVE_TICKS: usize = 32;

const MIN_TICK_PERIOD: Duration = Duration::from_micros(1);

pub struct TickPacer {
    clock: Box<dyn Clock>,
    period: Duration,
    max_consecutive_ticks: usize,
    tick_start: Instant,
    ticks_emitted: u64,
    start_pending: bool,
}

impl TickPacer {
    /// The first period starts now.
    pub fn new(period: Duration, max_consecutive_ticks: usize, clock: impl Clock + 'static) -> Self {
        let tick_start = clock.now();
        TickPacer {
            clock: Box::new(clock),
            period: period.max(MIN_TICK_PERIOD),
            max_consecutive_ticks: max_consecutive_ticks.max(1),
            tick_start,
            ticks_emitted: 0,
            start_pending: false,
        }
    }

    /// Start the first period on the first feed instead of at creation, so a
    /// pacer built ahead of the loop does not owe ticks for the setup time.
    pub fn start_on_first_feed(mut self) -> Self {
        self.start_pending = true;
        self
    }

    /// Start a fresh period at the current time.
    pub fn restart(&mut self) {
        self.tick_start = self.clock.now();
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn max_consecutive_ticks(&self) -> usize {
        self.max_consecutive_ticks
    }

    pub fn tick_start(&self) -> Instant {
        self.tick_start
    }

    /// Total ticks emitted since creation.
    pub fn ticks_emitted(&self) -> u64 {
        self.ticks_emitted
    }
}

impl Producer for TickPacer {
    fn feed(&mut self, dispatcher: &mut EventDispatcher, can_block: bool) -> usize {
        if std::mem::take(&mut self.start_pending) {
            self.restart();
        }
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.tick_start);

        let ticks = if elapsed >= self.period {
            let behind = elapsed.as_nanos() / self.period.as_nanos();
            let ticks = behind.min(self.max_consecutive_ticks as u128) as usize;
            if behind > ticks as u128 {
                warn!(
                    "Tick pacer {} periods behind; emitting {} and skipping the rest",
                    behind, ticks
                );
            }
            self.tick_start = now;
            ticks
        } else if can_block {
            self.clock.sleep(self.period - elapsed);
            self.tick_start += self.period;
            1
        } else {
            0
        };

        for _ in 0..ticks {
            dispatcher.queue_last(PhaseEvent::Tick);
        }
        self.ticks_emitted += ticks as u64;
        if ticks > 0 {
            trace!("Tick pacer emitted {} ticks", ticks);
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const PERIOD: Duration = Duration::from_millis(16);

    fn pacer(clock: &ManualClock) -> TickPacer {
        TickPacer::new(PERIOD, MAX_CONSECUTIVE_TICKS, clock.clone())
    }

    #[test]
    fn test_non_blocking_before_period_emits_nothing() {
        let clock = ManualClock::new();
        let mut pacer = pacer(&clock);
        let mut dispatcher = EventDispatcher::new();
        clock.advance(Duration::from_millis(10));
        assert_eq!(pacer.feed(&mut dispatcher, false), 0);
        assert!(dispatcher.is_queue_empty());
    }

    #[test]
    fn test_blocking_sleeps_and_advances_by_one_period() {
        let clock = ManualClock::new();
        let start = clock.now();
        let mut pacer = pacer(&clock);
        let mut dispatcher = EventDispatcher::new();

        clock.advance(Duration::from_millis(5));
        assert_eq!(pacer.feed(&mut dispatcher, true), 1);
        assert_eq!(clock.now() - start, PERIOD);
        assert_eq!(pacer.tick_start() - start, PERIOD);
        assert_eq!(dispatcher.queued_len(), 1);
    }

    #[test]
    fn test_elapsed_periods_emit_ticks_and_restart_at_now() {
        let clock = ManualClock::new();
        let mut pacer = pacer(&clock);
        let mut dispatcher = EventDispatcher::new();

        clock.advance(PERIOD * 3 + Duration::from_millis(4));
        assert_eq!(pacer.feed(&mut dispatcher, true), 3);
        assert_eq!(pacer.tick_start(), clock.now());
        assert_eq!(dispatcher.queued_len(), 3);
        assert!(dispatcher.queue().iter().all(|e| e.has_name("engine.tick")));
    }

    #[test]
    fn test_catch_up_is_capped() {
        let clock = ManualClock::new();
        let mut pacer = pacer(&clock);
        let mut dispatcher = EventDispatcher::new();

        clock.advance(PERIOD * 100);
        assert_eq!(pacer.feed(&mut dispatcher, false), MAX_CONSECUTIVE_TICKS);
        assert_eq!(dispatcher.queued_len(), MAX_CONSECUTIVE_TICKS);
        assert_eq!(pacer.ticks_emitted(), MAX_CONSECUTIVE_TICKS as u64);

        // the skipped periods are gone for good
        assert_eq!(pacer.feed(&mut dispatcher, false), 0);
    }

    #[test]
    fn test_exact_period_counts_as_elapsed() {
        let clock = ManualClock::new();
        let mut pacer = pacer(&clock);
        let mut dispatcher = EventDispatcher::new();
        clock.advance(PERIOD);
        assert_eq!(pacer.feed(&mut dispatcher, false), 1);
    }

    #[test]
    fn test_start_on_first_feed_ignores_setup_time() {
        let clock = ManualClock::new();
        let mut pacer = pacer(&clock).start_on_first_feed();
        let mut dispatcher = EventDispatcher::new();

        clock.advance(PERIOD * 10);
        assert_eq!(pacer.feed(&mut dispatcher, false), 0);
        assert_eq!(pacer.tick_start(), clock.now());

        clock.advance(PERIOD);
        assert_eq!(pacer.feed(&mut dispatcher, false), 1);
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let clock = ManualClock::new();
        let pacer = TickPacer::new(Duration::ZERO, 0, clock);
        assert!(pacer.period() > Duration::ZERO);
        assert_eq!(pacer.max_consecutive_ticks(), 1);
    }
}
