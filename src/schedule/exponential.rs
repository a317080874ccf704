//! Exponential backoff schedule with optional randomization.

use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::schedule::{Schedule, Tick};

/// Emitted delays are drawn from ±50% of the current interval.
const RANDOMIZATION_FACTOR: f64 = 0.5;

const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_MULTIPLIER: f64 = 1.5;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`ExponentialBackoff`].
///
/// Zero (or defaulted) numeric fields mean "use the documented default",
/// resolved once at construction:
///
/// | field                 | default |
/// |-----------------------|---------|
/// | `initial_interval`    | 500ms   |
/// | `max_interval`        | 30s     |
/// | `interval_multiplier` | 1.5     |
/// | `timeout`             | 1min    |
///
/// # Examples
///
/// ```rust
/// use anew::BackoffConfig;
/// use std::time::Duration;
///
/// // Override only what you care about; the rest is defaulted.
/// let config = BackoffConfig {
///     timeout: Duration::from_secs(10),
///     ..BackoffConfig::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackoffConfig {
    /// Delay before the first retry. Zero means 500ms.
    pub initial_interval: Duration,
    /// Cap on the delay between retries. Zero means 30s.
    pub max_interval: Duration,
    /// Factor applied to the current delay to produce the next one.
    /// Zero means 1.5.
    pub interval_multiplier: f64,
    /// Maximum duration of the whole retry session. Zero means 1min.
    pub timeout: Duration,
    /// Emit the deterministic growth curve instead of jittered values.
    pub disable_randomization: bool,
}

impl BackoffConfig {
    /// Resolve zero fields to their documented defaults.
    fn normalized(self) -> Self {
        Self {
            initial_interval: if self.initial_interval.is_zero() {
                DEFAULT_INITIAL_INTERVAL
            } else {
                self.initial_interval
            },
            max_interval: if self.max_interval.is_zero() {
                DEFAULT_MAX_INTERVAL
            } else {
                self.max_interval
            },
            interval_multiplier: if self.interval_multiplier == 0.0 {
                DEFAULT_MULTIPLIER
            } else {
                self.interval_multiplier
            },
            timeout: if self.timeout.is_zero() {
                DEFAULT_TIMEOUT
            } else {
                self.timeout
            },
            disable_randomization: self.disable_randomization,
        }
    }
}

/// A [`Schedule`] whose delays grow geometrically up to a cap.
///
/// The internal growth curve is `initial, initial * m, initial * m^2, ...`,
/// capped at `max_interval`. With randomization enabled (the default) the
/// *emitted* delay is drawn uniformly from ±50% around the current point on
/// that curve; the curve itself advances deterministically either way.
///
/// Once the session has been running longer than `timeout`, [`next`]
/// returns [`Tick::Stop`].
///
/// [`next`]: Schedule::next
///
/// # Examples
///
/// ```rust
/// use anew::{BackoffConfig, ExponentialBackoff, Schedule, Tick};
/// use std::time::Duration;
///
/// let mut backoff = ExponentialBackoff::new(BackoffConfig {
///     initial_interval: Duration::from_millis(500),
///     interval_multiplier: 2.0,
///     disable_randomization: true,
///     ..BackoffConfig::default()
/// });
///
/// assert_eq!(backoff.next(), Tick::Wait(Duration::from_millis(500)));
/// assert_eq!(backoff.next(), Tick::Wait(Duration::from_secs(1)));
/// assert_eq!(backoff.next(), Tick::Wait(Duration::from_secs(2)));
/// ```
#[derive(Debug)]
pub struct ExponentialBackoff<C = SystemClock> {
    config: BackoffConfig,
    current_delay: Duration,
    start_time: Instant,
    clock: C,
}

impl ExponentialBackoff {
    /// Create a backoff schedule on the system clock.
    ///
    /// Zero configuration fields are resolved to their defaults here, never
    /// at call time.
    pub fn new(config: BackoffConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> ExponentialBackoff<C> {
    /// Create a backoff schedule reading time from the given clock.
    pub fn with_clock(config: BackoffConfig, clock: C) -> Self {
        let start_time = clock.now();
        Self {
            config: config.normalized(),
            current_delay: Duration::ZERO,
            start_time,
            clock,
        }
    }

    /// The effective configuration after defaulting.
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// The next point on the deterministic growth curve.
    fn next_delay(&self) -> Duration {
        if self.current_delay.is_zero() {
            return self.config.initial_interval;
        }

        let scaled = self.current_delay.as_secs_f64() * self.config.interval_multiplier;
        Duration::try_from_secs_f64(scaled)
            .unwrap_or(Duration::MAX)
            .min(self.config.max_interval)
    }
}

impl<C: Clock> Schedule for ExponentialBackoff<C> {
    fn next(&mut self) -> Tick {
        let elapsed = self.clock.now().saturating_duration_since(self.start_time);

        let next = if self.config.disable_randomization {
            self.next_delay()
        } else {
            let current = if self.current_delay.is_zero() {
                self.config.initial_interval
            } else {
                self.current_delay
            };
            random_value_from_interval(RANDOMIZATION_FACTOR, rand::random::<f64>(), current)
        };

        // The curve advances whether or not the emitted value was jittered,
        // and even on the call that ends up stopping.
        self.current_delay = self.next_delay();

        if elapsed > self.config.timeout {
            return Tick::Stop;
        }

        Tick::Wait(next)
    }

    fn reset(&mut self) {
        self.start_time = self.clock.now();
        self.current_delay = Duration::ZERO;
    }
}

/// Draw a value from `[current - factor * current, current + factor * current]`.
///
/// `random` is a uniform sample from `[0, 1)`. The interval width gets one
/// extra nanosecond so the upper bound is reachable after truncation.
fn random_value_from_interval(
    randomization_factor: f64,
    random: f64,
    current: Duration,
) -> Duration {
    let current = current.as_nanos() as f64;
    let delta = randomization_factor * current;
    let min = current - delta;
    let max = current + delta;

    Duration::from_nanos((min + random * (max - min + 1.0)) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;
    use proptest::prelude::*;

    fn test_config() -> BackoffConfig {
        BackoffConfig {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            interval_multiplier: 2.0,
            timeout: Duration::from_secs(10),
            disable_randomization: true,
        }
    }

    #[test]
    fn deterministic_delays_grow_and_respect_the_cap() {
        let mut backoff = ExponentialBackoff::with_clock(test_config(), ManualClock::new());

        let expected = [
            Duration::from_millis(500),
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
            Duration::from_millis(5000),
            Duration::from_millis(5000),
        ];

        for delay in expected {
            assert_eq!(backoff.next(), Tick::Wait(delay));
        }
    }

    #[test]
    fn stops_once_elapsed_exceeds_timeout() {
        let clock = ManualClock::new();
        let mut backoff = ExponentialBackoff::with_clock(
            BackoffConfig {
                timeout: Duration::from_nanos(1),
                disable_randomization: true,
                ..BackoffConfig::default()
            },
            clock.clone(),
        );

        clock.advance(Duration::from_nanos(2));
        assert_eq!(backoff.next(), Tick::Stop);
    }

    #[test]
    fn elapsed_equal_to_timeout_still_emits() {
        let clock = ManualClock::new();
        let mut backoff = ExponentialBackoff::with_clock(
            BackoffConfig {
                timeout: Duration::from_secs(1),
                disable_randomization: true,
                ..BackoffConfig::default()
            },
            clock.clone(),
        );

        clock.advance(Duration::from_secs(1));
        assert_eq!(backoff.next(), Tick::Wait(Duration::from_millis(500)));
    }

    #[test]
    fn zero_fields_resolve_to_documented_defaults() {
        let backoff = ExponentialBackoff::new(BackoffConfig::default());

        assert_eq!(
            *backoff.config(),
            BackoffConfig {
                initial_interval: Duration::from_millis(500),
                max_interval: Duration::from_secs(30),
                interval_multiplier: 1.5,
                timeout: Duration::from_secs(60),
                disable_randomization: false,
            }
        );
    }

    #[test]
    fn explicit_fields_survive_normalization() {
        let backoff = ExponentialBackoff::new(test_config());
        assert_eq!(*backoff.config(), test_config());
    }

    #[test]
    fn jittered_delays_stay_within_their_bands() {
        let config = BackoffConfig {
            disable_randomization: false,
            ..test_config()
        };
        let mut backoff = ExponentialBackoff::with_clock(config, ManualClock::new());

        // The jitter base lags one step behind the growth curve: the first
        // two calls both jitter around the initial interval.
        let bases = [500u64, 500, 1000, 2000, 4000, 5000].map(Duration::from_millis);

        for base in bases {
            let delay = match backoff.next() {
                Tick::Wait(delay) => delay,
                Tick::Stop => panic!("schedule stopped early"),
            };
            assert!(delay >= base / 2, "{delay:?} below band for base {base:?}");
            assert!(
                delay <= base * 3 / 2 + Duration::from_nanos(1),
                "{delay:?} above band for base {base:?}"
            );
        }
    }

    #[test]
    fn jitter_does_not_perturb_the_growth_curve() {
        let config = BackoffConfig {
            disable_randomization: false,
            ..test_config()
        };
        let clock = ManualClock::new();
        let mut backoff = ExponentialBackoff::with_clock(config, clock);

        for _ in 0..4 {
            backoff.next();
        }
        // After four calls the curve has advanced 500 -> 1000 -> 2000 -> 4000.
        assert_eq!(backoff.current_delay, Duration::from_millis(4000));
    }

    #[test]
    fn reset_restarts_the_curve_and_the_session() {
        let clock = ManualClock::new();
        let mut backoff = ExponentialBackoff::with_clock(test_config(), clock.clone());

        backoff.next();
        backoff.next();
        clock.advance(Duration::from_secs(11));

        backoff.reset();
        assert_eq!(backoff.next(), Tick::Wait(Duration::from_millis(500)));
    }

    #[test]
    fn random_value_from_interval_spans_the_band() {
        let base = Duration::from_millis(500);

        assert_eq!(
            random_value_from_interval(0.5, 0.0, base),
            Duration::from_millis(250)
        );
        assert_eq!(
            random_value_from_interval(0.5, 0.5, base),
            Duration::from_millis(500)
        );
        // A sample just under 1.0 lands at the top of the band.
        let top = random_value_from_interval(0.5, 0.999_999_999, base);
        assert!(top > Duration::from_millis(749));
        assert!(top <= Duration::from_millis(750) + Duration::from_nanos(1));
    }

    proptest! {
        #[test]
        fn jitter_stays_within_half_to_one_and_a_half(
            random in 0.0f64..1.0,
            millis in 1u64..60_000,
        ) {
            let base = Duration::from_millis(millis);
            let value = random_value_from_interval(RANDOMIZATION_FACTOR, random, base);

            prop_assert!(value >= base / 2);
            prop_assert!(value <= base * 3 / 2 + Duration::from_nanos(1));
        }

        #[test]
        fn deterministic_curve_is_monotone_and_capped(
            initial in 1u64..1_000,
            cap in 1_000u64..30_000,
            multiplier in 1.0f64..3.0,
        ) {
            let config = BackoffConfig {
                initial_interval: Duration::from_millis(initial),
                max_interval: Duration::from_millis(cap),
                interval_multiplier: multiplier,
                timeout: Duration::from_secs(600),
                disable_randomization: true,
            };
            let mut backoff = ExponentialBackoff::with_clock(config, ManualClock::new());

            let mut last = Duration::ZERO;
            for _ in 0..12 {
                let delay = match backoff.next() {
                    Tick::Wait(delay) => delay,
                    Tick::Stop => panic!("schedule stopped early"),
                };
                prop_assert!(delay >= last);
                prop_assert!(delay <= Duration::from_millis(cap));
                last = delay;
            }
        }
    }
}
