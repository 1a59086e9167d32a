//! Retry policy types and configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::sleeper::{Sleeper, ThreadSleeper};
use crate::error::Error;

type DelayFn = Arc<dyn Fn() -> Duration + Send + Sync>;
type RetryHook = Arc<dyn Fn(&RetryEvent<'_>) + Send + Sync>;

/// A retry policy describing how to retry a failing step.
///
/// A policy is built once, never mutated, and can be shared by any number of
/// wrapped steps, including across threads.
///
/// # Bounds Behavior
///
/// `max_attempts` counts every attempt, the first one included:
/// `max_attempts = 3` means one initial attempt plus two retries.
///
/// `max_attempts = 0` retries **forever**. The loop then only ends when the
/// operation succeeds or the wait is interrupted through an
/// [`InterruptibleSleeper`](super::InterruptibleSleeper); an operation that
/// never succeeds blocks the calling thread indefinitely.
///
/// # Examples
///
/// ```rust
/// use trywise::RetryPolicy;
/// use std::time::Duration;
///
/// // Exponential backoff, at most 5 attempts
/// let policy = RetryPolicy::exponential(Duration::from_millis(100), 5);
/// assert_eq!(policy.max_attempts(), 5);
///
/// // Constant delay with a cap on how long any single wait may be
/// let policy = RetryPolicy::constant(Duration::from_millis(500), 3)
///     .with_max_delay(Duration::from_millis(200));
/// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(200)));
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    backoff: Backoff,
    max_attempts: u32,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
    sleeper: Arc<dyn Sleeper>,
    on_retry: Option<RetryHook>,
}

/// The backoff strategy for retry delays.
#[derive(Clone)]
pub enum Backoff {
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay increases linearly: base * (retry + 1).
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^retry.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay follows Fibonacci sequence: fib(retry + 1) * base.
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay produced by a caller function, invoked again before every retry.
    Dynamic(DelayFn),
}

impl Backoff {
    /// Delay before retry `retry` (0-indexed), before capping and jitter.
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            Backoff::Constant(d) => *d,
            Backoff::Linear { base } => base.saturating_mul(retry.saturating_add(1)),
            Backoff::Exponential { base } => base.saturating_mul(2u32.saturating_pow(retry)),
            Backoff::Fibonacci { base } => {
                base.saturating_mul(fibonacci(retry.saturating_add(1)))
            }
            Backoff::Dynamic(f) => f(),
        }
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backoff::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            Backoff::Linear { base } => f.debug_struct("Linear").field("base", base).finish(),
            Backoff::Exponential { base } => {
                f.debug_struct("Exponential").field("base", base).finish()
            }
            Backoff::Fibonacci { base } => {
                f.debug_struct("Fibonacci").field("base", base).finish()
            }
            Backoff::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
    /// Random delay between 0 and calculated delay (AWS recommended).
    Full,
    /// Decorrelated jitter (AWS style).
    Decorrelated,
}

/// Information about a failed attempt, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a Error,
    /// Delay before next attempt (`None` when no attempt follows).
    pub next_delay: Option<Duration>,
    /// Total elapsed time since first attempt.
    pub elapsed: Duration,
}

impl RetryPolicy {
    /// Create a policy from a backoff and an attempt bound (`0` = unbounded).
    pub fn new(backoff: Backoff, max_attempts: u32) -> Self {
        Self {
            backoff,
            max_attempts,
            max_delay: None,
            jitter: JitterStrategy::None,
            sleeper: Arc::new(ThreadSleeper),
            on_retry: None,
        }
    }

    /// Create a policy with constant delay between attempts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trywise::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::constant(Duration::from_millis(500), 4);
    ///
    /// // Every retry waits 500ms; no wait follows the fourth attempt
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(3), None);
    /// ```
    pub fn constant(delay: Duration, max_attempts: u32) -> Self {
        Self::new(Backoff::Constant(delay), max_attempts)
    }

    /// Create a policy whose delay is computed by `delay` before each retry.
    ///
    /// The function is not cached: it runs once per retry, so it may return a
    /// different delay every time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::atomic::{AtomicU64, Ordering};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use trywise::RetryPolicy;
    ///
    /// let step = Arc::new(AtomicU64::new(0));
    /// let policy = RetryPolicy::from_fn(
    ///     move || Duration::from_millis(10 * step.fetch_add(1, Ordering::SeqCst)),
    ///     5,
    /// );
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(0)));
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(10)));
    /// ```
    pub fn from_fn<F>(delay: F, max_attempts: u32) -> Self
    where
        F: Fn() -> Duration + Send + Sync + 'static,
    {
        Self::new(Backoff::Dynamic(Arc::new(delay)), max_attempts)
    }

    /// Create a policy with linearly increasing delay.
    ///
    /// Delay = base * (retry + 1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trywise::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::linear(Duration::from_millis(100), 6);
    ///
    /// // Delay increases: 100ms, 200ms, 300ms, ...
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(300)));
    /// ```
    pub fn linear(base: Duration, max_attempts: u32) -> Self {
        Self::new(Backoff::Linear { base }, max_attempts)
    }

    /// Create a policy with exponentially increasing delay.
    ///
    /// Delay = base * 2^retry
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trywise::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100), 6);
    ///
    /// // Delay doubles: 100ms, 200ms, 400ms, ...
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(400)));
    /// ```
    pub fn exponential(base: Duration, max_attempts: u32) -> Self {
        Self::new(Backoff::Exponential { base }, max_attempts)
    }

    /// Create a policy with Fibonacci-based delay.
    ///
    /// Delay = base * fib(retry + 1)
    pub fn fibonacci(base: Duration, max_attempts: u32) -> Self {
        Self::new(Backoff::Fibonacci { base }, max_attempts)
    }

    /// Replace the attempt bound. `0` retries until success.
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the maximum delay cap.
    ///
    /// Delays will never exceed this value, regardless of the backoff strategy.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add proportional jitter to delays.
    ///
    /// The factor determines the range of randomness. For example, `0.25` means
    /// the actual delay will be ±25% of the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays are unchanged.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = JitterStrategy::Proportional(factor.clamp(0.0, 1.0));
        self
    }

    /// Use full jitter (AWS recommended).
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays are unchanged.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Use decorrelated jitter (AWS style).
    ///
    /// Each delay is random between base and 3x the previous delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays are unchanged.
    pub fn with_decorrelated_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Decorrelated;
        self
    }

    /// Set the jitter strategy directly.
    pub fn with_jitter_strategy(mut self, jitter: JitterStrategy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Wait between attempts with `sleeper` instead of `std::thread::sleep`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use trywise::retry::{self, TrackingSleeper};
    /// use trywise::RetryPolicy;
    ///
    /// let sleeper = TrackingSleeper::new();
    /// let policy = RetryPolicy::constant(Duration::from_secs(30), 3)
    ///     .with_sleeper(sleeper.clone());
    ///
    /// let _ = retry::retry(&policy, || Err::<(), _>("down"));
    ///
    /// // Two waits: none after the final attempt
    /// assert_eq!(sleeper.calls(), vec![Duration::from_secs(30); 2]);
    /// ```
    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Call `hook` after every failed attempt, before waiting.
    ///
    /// The hook is synchronous and should not block; use it for logging or
    /// metrics.
    pub fn with_on_retry<H>(mut self, hook: H) -> Self
    where
        H: Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    /// Get the attempt bound (`0` = unbounded).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` when the policy retries until success.
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts == 0
    }

    /// Get the backoff strategy.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Get the sleeper used between attempts.
    pub fn sleeper(&self) -> &dyn Sleeper {
        &*self.sleeper
    }

    /// Calculate the delay before retry N (0-indexed), i.e. the wait after
    /// attempt N + 1 failed.
    ///
    /// Returns None when attempt N + 1 is the last one permitted.
    pub fn delay_for_attempt(&self, retry: u32) -> Option<Duration> {
        if self.max_attempts > 0 && retry.saturating_add(1) >= self.max_attempts {
            return None;
        }

        let base_delay = self.backoff.delay(retry);

        let capped = match self.max_delay {
            Some(max) => base_delay.min(max),
            None => base_delay,
        };

        Some(capped)
    }

    /// Calculate the delay with jitter applied.
    ///
    /// This is used internally by the retry executor.
    #[doc(hidden)]
    pub fn delay_with_jitter(&self, retry: u32, prev_delay: Option<Duration>) -> Option<Duration> {
        let base_delay = self.delay_for_attempt(retry)?;
        Some(self.jitter.apply(base_delay, prev_delay, self.max_delay))
    }

    pub(crate) fn notify(&self, event: &RetryEvent<'_>) {
        if let Some(hook) = &self.on_retry {
            hook(event);
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("backoff", &self.backoff)
            .field("max_attempts", &self.max_attempts)
            .field("max_delay", &self.max_delay)
            .field("jitter", &self.jitter)
            .field("sleeper", &self.sleeper)
            .field("on_retry", &self.on_retry.as_ref().map(|_| ".."))
            .finish()
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay.
    ///
    /// # Arguments
    ///
    /// * `base_delay` - The calculated delay before jitter
    /// * `prev_delay` - The previous delay (for decorrelated jitter)
    /// * `max_delay` - Optional cap on the final delay
    pub fn apply(
        &self,
        base_delay: Duration,
        #[cfg_attr(not(feature = "jitter"), allow(unused_variables))] prev_delay: Option<Duration>,
        max_delay: Option<Duration>,
    ) -> Duration {
        let jittered = match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let mut rng = rand::rng();
                let base_millis = base_delay.as_millis() as f64;
                let jitter_range = base_millis * factor;
                let min = (base_millis - jitter_range).max(0.0);
                let max = base_millis + jitter_range;
                let jittered_millis = rng.random_range(min..=max);
                Duration::from_millis(jittered_millis as u64)
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let mut rng = rand::rng();
                let max_millis = base_delay.as_millis() as u64;
                if max_millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rng.random_range(0..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Full => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Decorrelated => {
                use rand::Rng;
                let mut rng = rand::rng();
                let prev = prev_delay.unwrap_or(base_delay);
                let base_millis = base_delay.as_millis() as u64;
                let max_millis = prev.as_millis().saturating_mul(3) as u64;
                if max_millis <= base_millis {
                    base_delay
                } else {
                    Duration::from_millis(rng.random_range(base_millis..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Decorrelated => base_delay,
        };

        match max_delay {
            Some(max) => jittered.min(max),
            None => jittered,
        }
    }
}

/// Calculate the nth Fibonacci number.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let temp = a.saturating_add(b);
        a = b;
        b = temp;
    }
    b
}
