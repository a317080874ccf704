//! The retry engine: orchestrates attempts, delays, and cancellation.
//!
//! A [`Retryer`] owns one [`Schedule`] and one [`Timer`] and drives an
//! [`Operation`] through the loop described below. Each `retry` call is one
//! session: the schedule is reset at the start, and the timer is released
//! exactly once on exit, whichever branch exits.
//!
//! The loop:
//!
//! 1. Run the operation. Success returns immediately.
//! 2. A [`Permanent`](OperationError::Permanent) error returns its unwrapped
//!    cause immediately, without consulting the schedule.
//! 3. Otherwise ask the schedule for a tick. [`Tick::Stop`] returns the last
//!    transient error, unless the token is already cancelled; then the
//!    cancellation wins. [`Tick::Wait`] arms the timer and races it against
//!    the cancellation token.
//!
//! # Quick Start
//!
//! ```rust
//! use anew::{with_exponential_backoff, BackoffConfig, CancellationToken};
//!
//! # tokio_test::block_on(async {
//! let token = CancellationToken::new();
//! let mut retryer = with_exponential_backoff(BackoffConfig::default());
//!
//! let value = retryer
//!     .retry(&token, |_token: CancellationToken| async {
//!         Ok::<_, anew::OperationError<String>>(42)
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(value, 42);
//! # });
//! ```

mod error;

pub use error::{OperationError, RetryError};

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::schedule::{BackoffConfig, ConstantDelay, ExponentialBackoff, Schedule, Tick};
use crate::timer::{Timer, TokioTimer};

/// A fallible, cancellation-aware unit of work.
///
/// The engine never looks inside an operation beyond the error it returns.
/// Each invocation receives a clone of the session's cancellation token, so
/// long-running work can observe cancellation itself. The engine only
/// checks the token between attempts; it never interrupts a running one.
///
/// Any `FnMut(CancellationToken) -> Future<Output = Result<T,
/// OperationError<E>>>` is an operation, so closures work directly:
///
/// ```rust
/// use anew::{CancellationToken, OperationError};
///
/// # tokio_test::block_on(async {
/// let token = CancellationToken::new();
/// let value = anew::retry(&token, |_token: CancellationToken| async {
///     Ok::<_, OperationError<String>>("ready")
/// })
/// .await
/// .unwrap();
/// assert_eq!(value, "ready");
/// # });
/// ```
pub trait Operation<T, E> {
    /// Execute one attempt.
    fn run(
        &mut self,
        token: CancellationToken,
    ) -> impl Future<Output = Result<T, OperationError<E>>> + Send;
}

impl<T, E, F, Fut> Operation<T, E> for F
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, OperationError<E>>> + Send,
{
    fn run(
        &mut self,
        token: CancellationToken,
    ) -> impl Future<Output = Result<T, OperationError<E>>> + Send {
        (self)(token)
    }
}

/// Drives an [`Operation`] until success, permanent failure, schedule
/// exhaustion, or cancellation.
///
/// A retryer owns its schedule and timer, so concurrent sessions need their
/// own retryer each: `retry` takes `&mut self` and the borrow checker
/// enforces the rest. One retryer can run any number of sessions in
/// sequence; the schedule is reset per session.
#[derive(Debug)]
pub struct Retryer<S, W = TokioTimer> {
    schedule: S,
    timer: W,
}

impl<S: Schedule, W: Timer> Retryer<S, W> {
    /// Create an engine from a schedule and a timer.
    pub fn new(schedule: S, timer: W) -> Self {
        Self { schedule, timer }
    }

    /// The engine's schedule.
    pub fn schedule(&self) -> &S {
        &self.schedule
    }

    /// The engine's timer.
    pub fn timer(&self) -> &W {
        &self.timer
    }

    /// Run `operation` until it succeeds, fails permanently, the schedule
    /// stops, or `token` is cancelled.
    ///
    /// Errors surface per the taxonomy in [`RetryError`]: exhaustion returns
    /// the *last* transient error, not a synthetic "gave up" error, and
    /// cancellation takes precedence when both hold at once.
    pub async fn retry<T, E, O>(
        &mut self,
        token: &CancellationToken,
        mut operation: O,
    ) -> Result<T, RetryError<E>>
    where
        O: Operation<T, E>,
    {
        let Self { schedule, timer } = self;
        // Releases the timer on every exit path.
        let mut timer = SessionTimer(timer);

        schedule.reset();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match operation.run(token.clone()).await {
                Ok(value) => return Ok(value),
                Err(OperationError::Permanent(cause)) => {
                    tracing::debug!(attempt, "operation failed permanently, giving up");
                    return Err(RetryError::Operation(cause));
                }
                Err(OperationError::Transient(error)) => match schedule.next() {
                    Tick::Stop => {
                        if token.is_cancelled() {
                            return Err(RetryError::Cancelled);
                        }
                        tracing::debug!(attempt, "schedule exhausted, returning last error");
                        return Err(RetryError::Operation(error));
                    }
                    Tick::Wait(delay) => {
                        tracing::trace!(attempt, ?delay, "operation failed, waiting to retry");
                        timer.start(delay);
                        tokio::select! {
                            _ = token.cancelled() => {
                                tracing::debug!(attempt, "cancelled while waiting to retry");
                                return Err(RetryError::Cancelled);
                            }
                            () = timer.wait() => {}
                        }
                    }
                },
            }
        }
    }
}

/// Scopes a timer to one retry session; stops it exactly once on drop.
struct SessionTimer<'a, W: Timer>(&'a mut W);

impl<W: Timer> SessionTimer<'_, W> {
    fn start(&mut self, delay: Duration) {
        self.0.start(delay);
    }

    async fn wait(&mut self) {
        self.0.wait().await;
    }
}

impl<W: Timer> Drop for SessionTimer<'_, W> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// An engine with [`ExponentialBackoff`] delays and the tokio timer.
///
/// # Examples
///
/// ```rust
/// use anew::{with_exponential_backoff, BackoffConfig};
/// use std::time::Duration;
///
/// let retryer = with_exponential_backoff(BackoffConfig {
///     timeout: Duration::from_secs(10),
///     ..BackoffConfig::default()
/// });
/// # let _ = retryer;
/// ```
pub fn with_exponential_backoff(config: BackoffConfig) -> Retryer<ExponentialBackoff> {
    Retryer::new(ExponentialBackoff::new(config), TokioTimer::new())
}

/// An engine with [`ConstantDelay`] retries and the tokio timer.
///
/// # Panics
///
/// Panics if `delay` or `timeout` is zero.
pub fn with_constant_delay(delay: Duration, timeout: Duration) -> Retryer<ConstantDelay> {
    Retryer::new(ConstantDelay::new(delay, timeout), TokioTimer::new())
}

/// An engine with a caller-provided [`Schedule`] and the tokio timer.
///
/// This is the escape hatch for delay strategies the built-in schedules
/// don't cover.
pub fn with_schedule<S: Schedule>(schedule: S) -> Retryer<S> {
    Retryer::new(schedule, TokioTimer::new())
}

/// Retry `operation` with a default exponential backoff.
///
/// Shorthand for [`with_exponential_backoff`] with a default
/// [`BackoffConfig`]: 500ms initial delay growing 1.5x up to 30s, ±50%
/// jitter, giving up after one minute.
pub async fn retry<T, E, O>(
    token: &CancellationToken,
    operation: O,
) -> Result<T, RetryError<E>>
where
    O: Operation<T, E>,
{
    with_exponential_backoff(BackoffConfig::default())
        .retry(token, operation)
        .await
}
