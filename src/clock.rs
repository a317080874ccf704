//! Wall-clock abstraction for elapsed-time tracking.
//!
//! Schedules measure how long a retry session has been running by
//! subtracting two instants from a [`Clock`]. Injecting the clock keeps the
//! schedules deterministic under test; see [`crate::testing::ManualClock`].

use std::time::Instant;

/// A source of the current instant.
///
/// The only requirement is that instants are monotonic enough for
/// elapsed-time subtraction to be meaningful. No wall-clock-jump correction
/// is attempted.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// The process clock, backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
