//! Rearmable timer abstraction used by the retry engine.
//!
//! One timer instance is scoped to one retry session: the engine arms it
//! before every wait, races it against cancellation, and releases it exactly
//! once when the session ends.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Sleep;

/// A waitable timer that becomes ready after a programmed delay.
///
/// Contract:
/// - [`start`](Timer::start) arms the timer, or rearms it if already armed.
/// - [`wait`](Timer::wait) resolves once per arm. Waiting on a timer that
///   was never armed pends forever.
/// - [`stop`](Timer::stop) releases the timer's resources. Calling it
///   before [`start`](Timer::start) is a no-op.
pub trait Timer {
    /// Arm (or rearm) the timer to fire after `delay`.
    fn start(&mut self, delay: Duration);

    /// Resolves when the armed timer fires.
    fn wait(&mut self) -> impl Future<Output = ()> + Send;

    /// Release the timer. Safe to call without a prior [`start`](Timer::start).
    fn stop(&mut self);
}

/// The default [`Timer`], backed by [`tokio::time::Sleep`].
///
/// The underlying sleep is created lazily on the first [`start`](Timer::start)
/// and rearmed in place on subsequent starts, so a whole retry session uses a
/// single timer allocation.
#[derive(Debug, Default)]
pub struct TokioTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl TokioTimer {
    /// Create an unarmed timer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Timer for TokioTimer {
    fn start(&mut self, delay: Duration) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                let deadline = tokio::time::Instant::now() + delay;
                sleep.as_mut().reset(deadline);
            }
            None => self.sleep = Some(Box::pin(tokio::time::sleep(delay))),
        }
    }

    fn wait(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            match self.sleep.as_mut() {
                Some(sleep) => sleep.as_mut().await,
                None => std::future::pending().await,
            }
        }
    }

    fn stop(&mut self) {
        self.sleep = None;
    }
}
