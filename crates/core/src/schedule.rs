//! Time sources and restart-on-change debouncing.
//!
//! All scheduling is cooperative: nothing here spawns threads or timers.
//! The owner asks [`Debouncer::poll`] on each tick of its event loop whether
//! the pending action is due.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Fires once, `delay` after the most recent call to [`schedule`](Self::schedule).
///
/// Every schedule replaces the pending deadline, so a burst of calls
/// produces a single firing after the burst ends.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending firing and schedules a new one.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(20);

    #[test]
    fn burst_fires_once_after_last_call() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        let mut fired = 0;

        for _ in 0..5 {
            debouncer.schedule(clock.now());
            clock.advance(Duration::from_millis(5));
            if debouncer.poll(clock.now()) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0);

        // 15ms after the last schedule: still waiting.
        clock.advance(Duration::from_millis(10));
        assert!(!debouncer.poll(clock.now()));

        clock.advance(Duration::from_millis(5));
        assert!(debouncer.poll(clock.now()));
        assert!(!debouncer.poll(clock.now()));
    }

    #[test]
    fn cancel_drops_pending() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(clock.now());
        debouncer.cancel();
        clock.advance(DELAY * 2);
        assert!(!debouncer.poll(clock.now()));
        assert!(!debouncer.is_pending());
    }
}
