//! Testing utilities for schedule and engine code.
//!
//! Schedules decide when to stop by measuring elapsed time, which makes them
//! awkward to test against the real clock. [`ManualClock`] is a [`Clock`]
//! that only moves when told to, so timeout behavior can be exercised
//! without sleeping.
//!
//! # Examples
//!
//! ```rust
//! use anew::testing::ManualClock;
//! use anew::{ConstantDelay, Schedule, Tick};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut schedule =
//!     ConstantDelay::with_clock(Duration::from_millis(100), Duration::from_secs(1), clock.clone());
//!
//! assert_eq!(schedule.next(), Tick::Wait(Duration::from_millis(100)));
//!
//! clock.advance(Duration::from_secs(2));
//! assert_eq!(schedule.next(), Tick::Stop);
//! ```

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;

/// A [`Clock`] advanced by hand.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// and give another to the schedule under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("clock mutex poisoned")
    }
}
