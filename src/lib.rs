//! # Anew
//!
//! > *"Try, wait, try anew"*
//!
//! A retry engine for fallible async operations.
//!
//! ## Philosophy
//!
//! **Anew** separates the three concerns of retrying:
//! - **Schedule**: a stateful generator deciding *how long* to wait between
//!   attempts, or when to give up
//! - **Timer**: the waiting itself, a single rearmable timer per retry session
//! - **Engine**: the loop racing the timer against cooperative cancellation
//!
//! Each is a small capability trait, so schedules are testable without real
//! elapsed time and the engine is testable without real schedules or timers.
//!
//! ## Quick Example
//!
//! ```rust
//! use anew::{with_constant_delay, CancellationToken, OperationError};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let token = CancellationToken::new();
//! let mut retryer = with_constant_delay(Duration::from_millis(10), Duration::from_secs(5));
//!
//! let mut attempts = 0;
//! let value = retryer
//!     .retry(&token, |_token: CancellationToken| {
//!         attempts += 1;
//!         let attempt = attempts;
//!         async move {
//!             if attempt < 3 {
//!                 Err(OperationError::transient("connection refused"))
//!             } else {
//!                 Ok(attempt)
//!             }
//!         }
//!     })
//!     .await
//!     .expect("operation eventually succeeds");
//!
//! assert_eq!(value, 3);
//! # });
//! ```
//!
//! ## Giving up early
//!
//! An operation opts out of further retries by marking its error permanent:
//!
//! ```rust
//! use anew::OperationError;
//!
//! let err: OperationError<&str> = OperationError::permanent("invalid credentials");
//! assert!(err.is_permanent());
//! assert_eq!(err.into_inner(), "invalid credentials");
//! ```
//!
//! Cancelling the [`CancellationToken`] stops the retry loop at the next
//! wait point and surfaces [`RetryError::Cancelled`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod clock;
pub mod retry;
pub mod schedule;
pub mod testing;
pub mod timer;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use retry::{
    retry, with_constant_delay, with_exponential_backoff, with_schedule, Operation,
    OperationError, RetryError, Retryer,
};
pub use schedule::{BackoffConfig, ConstantDelay, ExponentialBackoff, Schedule, Tick};
pub use timer::{Timer, TokioTimer};

/// The cancellation primitive accepted by [`Retryer::retry`].
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::retry::{
        retry, with_constant_delay, with_exponential_backoff, with_schedule, Operation,
        OperationError, RetryError, Retryer,
    };
    pub use crate::schedule::{BackoffConfig, ConstantDelay, ExponentialBackoff, Schedule, Tick};
    pub use crate::timer::{Timer, TokioTimer};
    pub use crate::CancellationToken;
}
