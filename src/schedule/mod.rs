//! Tick schedules: stateful generators of retry delays.
//!
//! A schedule answers one question, repeatedly: *should the engine wait and
//! try again, and if so, for how long?* The answer is a [`Tick`]. Two
//! schedules are built in:
//!
//! - [`ExponentialBackoff`]: delays grow geometrically up to a cap, with
//!   ±50% jitter by default
//! - [`ConstantDelay`]: the same delay every time
//!
//! Both stop once the session's elapsed time exceeds their timeout. Anything
//! else implementing [`Schedule`] plugs into the engine via
//! [`crate::with_schedule`].

mod constant;
mod exponential;

pub use constant::ConstantDelay;
pub use exponential::{BackoffConfig, ExponentialBackoff};

use std::time::Duration;

/// One schedule decision: wait this long, or stop retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Wait for the given delay, then attempt the operation again.
    Wait(Duration),
    /// The schedule is exhausted; stop retrying.
    Stop,
}

impl Tick {
    /// Returns the delay to wait, or `None` if the schedule stopped.
    pub fn delay(self) -> Option<Duration> {
        match self {
            Tick::Wait(delay) => Some(delay),
            Tick::Stop => None,
        }
    }

    /// Returns true if the schedule is exhausted.
    pub fn is_stop(self) -> bool {
        matches!(self, Tick::Stop)
    }
}

/// A resettable generator of [`Tick`]s.
///
/// A schedule instance is owned by one retry session at a time. The engine
/// calls [`reset`](Schedule::reset) at the start of every session, so a
/// schedule may be reused across sessions.
pub trait Schedule {
    /// Produce the next decision, advancing internal state.
    fn next(&mut self) -> Tick;

    /// Re-anchor elapsed-time tracking and clear accumulated state.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_delay_accessor() {
        assert_eq!(
            Tick::Wait(Duration::from_millis(5)).delay(),
            Some(Duration::from_millis(5))
        );
        assert_eq!(Tick::Stop.delay(), None);
    }

    #[test]
    fn tick_is_stop() {
        assert!(Tick::Stop.is_stop());
        assert!(!Tick::Wait(Duration::ZERO).is_stop());
    }
}
