//! Debounce timer and clocks.
//!
//! Filter syncs are coalesced by an explicit timer handle: every new call
//! re-arms the deadline, and the host's event loop polls for expiry. There
//! is no background thread; time only moves when the host asks.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock for deterministic tests and scripted replays.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the navigator.
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
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Cancellable, re-armable one-shot deadline.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Time left before firing, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Disarm and return true if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let clock = ManualClock::new();
        let mut timer = DebounceTimer::new(Duration::from_millis(100));
        assert!(!timer.is_pending());

        timer.schedule(clock.now());
        clock.advance(Duration::from_millis(99));
        assert!(!timer.fire_if_due(clock.now()));
        assert_eq!(timer.remaining(clock.now()), Some(Duration::from_millis(1)));

        clock.advance(Duration::from_millis(1));
        assert!(timer.fire_if_due(clock.now()));
        assert!(!timer.is_pending());
        assert!(!timer.fire_if_due(clock.now()));
    }

    #[test]
    fn test_reschedule_extends_deadline() {
        let clock = ManualClock::new();
        let mut timer = DebounceTimer::new(Duration::from_millis(100));
        timer.schedule(clock.now());
        clock.advance(Duration::from_millis(80));
        timer.schedule(clock.now());
        clock.advance(Duration::from_millis(80));
        assert!(!timer.is_due(clock.now()));
        clock.advance(Duration::from_millis(20));
        assert!(timer.is_due(clock.now()));
    }

    #[test]
    fn test_cancel() {
        let clock = ManualClock::new();
        let mut timer = DebounceTimer::new(Duration::from_millis(10));
        timer.schedule(clock.now());
        timer.cancel();
        clock.advance(Duration::from_secs(1));
        assert!(!timer.fire_if_due(clock.now()));
        assert_eq!(timer.remaining(clock.now()), None);
    }

    #[test]
    fn test_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = other.now();
        clock.advance(Duration::from_millis(5));
        assert_eq!(other.now() - start, Duration::from_millis(5));
    }
}
