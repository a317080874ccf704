//! Constant delay schedule.

use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::schedule::{Schedule, Tick};

/// A [`Schedule`] that emits the same delay until its timeout elapses.
///
/// # Examples
///
/// ```rust
/// use anew::{ConstantDelay, Schedule, Tick};
/// use std::time::Duration;
///
/// let mut schedule = ConstantDelay::new(Duration::from_millis(250), Duration::from_secs(30));
///
/// assert_eq!(schedule.next(), Tick::Wait(Duration::from_millis(250)));
/// assert_eq!(schedule.next(), Tick::Wait(Duration::from_millis(250)));
/// ```
///
/// # Panics
///
/// Construction panics if `delay` or `timeout` is zero; a schedule that
/// waits for nothing or stops immediately is a configuration bug, not a
/// runtime condition.
#[derive(Debug)]
pub struct ConstantDelay<C = SystemClock> {
    delay: Duration,
    timeout: Duration,
    start_time: Instant,
    clock: C,
}

impl ConstantDelay {
    /// Create a constant delay schedule on the system clock.
    ///
    /// # Panics
    ///
    /// Panics if `delay` or `timeout` is zero.
    pub fn new(delay: Duration, timeout: Duration) -> Self {
        Self::with_clock(delay, timeout, SystemClock)
    }
}

impl<C: Clock> ConstantDelay<C> {
    /// Create a constant delay schedule reading time from the given clock.
    ///
    /// # Panics
    ///
    /// Panics if `delay` or `timeout` is zero.
    pub fn with_clock(delay: Duration, timeout: Duration, clock: C) -> Self {
        assert!(!delay.is_zero(), "constant delay schedule requires a nonzero delay");
        assert!(!timeout.is_zero(), "constant delay schedule requires a nonzero timeout");

        let start_time = clock.now();
        Self {
            delay,
            timeout,
            start_time,
            clock,
        }
    }

    /// The delay emitted by every tick.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The maximum duration of one retry session.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<C: Clock> Schedule for ConstantDelay<C> {
    fn next(&mut self) -> Tick {
        let elapsed = self.clock.now().saturating_duration_since(self.start_time);
        if elapsed > self.timeout {
            return Tick::Stop;
        }

        Tick::Wait(self.delay)
    }

    fn reset(&mut self) {
        self.start_time = self.clock.now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    #[test]
    fn delay_is_always_the_same() {
        let mut schedule = ConstantDelay::with_clock(
            Duration::from_millis(500),
            Duration::from_secs(3600),
            ManualClock::new(),
        );

        for _ in 0..4 {
            assert_eq!(schedule.next(), Tick::Wait(Duration::from_millis(500)));
        }
    }

    #[test]
    fn stops_once_elapsed_exceeds_timeout() {
        let clock = ManualClock::new();
        let mut schedule = ConstantDelay::with_clock(
            Duration::from_millis(500),
            Duration::from_nanos(1),
            clock.clone(),
        );

        clock.advance(Duration::from_nanos(2));
        assert_eq!(schedule.next(), Tick::Stop);
    }

    #[test]
    fn reset_reopens_an_exhausted_schedule() {
        let clock = ManualClock::new();
        let mut schedule = ConstantDelay::with_clock(
            Duration::from_millis(500),
            Duration::from_secs(1),
            clock.clone(),
        );

        clock.advance(Duration::from_secs(2));
        assert_eq!(schedule.next(), Tick::Stop);

        schedule.reset();
        assert_eq!(schedule.next(), Tick::Wait(Duration::from_millis(500)));
    }

    #[test]
    #[should_panic(expected = "nonzero delay")]
    fn zero_delay_fails_construction() {
        ConstantDelay::new(Duration::ZERO, Duration::from_secs(1));
    }

    #[test]
    #[should_panic(expected = "nonzero timeout")]
    fn zero_timeout_fails_construction() {
        ConstantDelay::new(Duration::from_secs(1), Duration::ZERO);
    }
}
