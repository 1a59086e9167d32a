//! Plain-data retry configuration.
//!
//! [`RetryPolicy`] holds closures and a sleeper, so it cannot be written down
//! in a config file. [`RetryConfig`] is the serialisable subset; with the
//! `serde` feature it (de)serialises and converts into a policy.

use std::time::Duration;

use super::policy::{Backoff, JitterStrategy, RetryPolicy};

/// Serialisable description of a [`RetryPolicy`].
///
/// # Examples
///
/// ```rust
/// use trywise::retry::{BackoffConfig, RetryConfig};
/// use trywise::RetryPolicy;
/// use std::time::Duration;
///
/// let config = RetryConfig {
///     max_attempts: 4,
///     backoff: BackoffConfig::Exponential { base_ms: 50 },
///     ..RetryConfig::default()
/// };
///
/// let policy = RetryPolicy::from(config);
/// assert_eq!(policy.max_attempts(), 4);
/// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(100)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryConfig {
    /// Attempt bound, first attempt included; `0` retries until success.
    ///
    /// `0` is the only way to say "unbounded": the field is unsigned, so a
    /// negative value in a config file is rejected when deserializing.
    pub max_attempts: u32,
    /// How the delay between attempts grows.
    pub backoff: BackoffConfig,
    /// Cap on any single delay, in milliseconds.
    pub max_delay_ms: Option<u64>,
    /// Randomness added to each delay.
    pub jitter: JitterStrategy,
}

/// Serialisable backoff strategy. Durations are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "strategy", rename_all = "snake_case")
)]
pub enum BackoffConfig {
    /// Same delay every time.
    Constant {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// `base * (retry + 1)`.
    Linear {
        /// Base delay in milliseconds.
        base_ms: u64,
    },
    /// `base * 2^retry`.
    Exponential {
        /// Base delay in milliseconds.
        base_ms: u64,
    },
    /// `base * fib(retry + 1)`.
    Fibonacci {
        /// Base delay in milliseconds.
        base_ms: u64,
    },
}

impl Default for RetryConfig {
    /// Five attempts, 10ms apart.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: BackoffConfig::Constant { delay_ms: 10 },
            max_delay_ms: None,
            jitter: JitterStrategy::None,
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig::Constant { delay_ms: 10 }
    }
}

impl From<BackoffConfig> for Backoff {
    fn from(config: BackoffConfig) -> Self {
        match config {
            BackoffConfig::Constant { delay_ms } => Backoff::Constant(Duration::from_millis(delay_ms)),
            BackoffConfig::Linear { base_ms } => Backoff::Linear {
                base: Duration::from_millis(base_ms),
            },
            BackoffConfig::Exponential { base_ms } => Backoff::Exponential {
                base: Duration::from_millis(base_ms),
            },
            BackoffConfig::Fibonacci { base_ms } => Backoff::Fibonacci {
                base: Duration::from_millis(base_ms),
            },
        }
    }
}

impl RetryConfig {
    /// Build the policy this configuration describes.
    pub fn into_policy(self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.backoff.into(), self.max_attempts)
            .with_jitter_strategy(self.jitter);
        match self.max_delay_ms {
            Some(ms) => policy.with_max_delay(Duration::from_millis(ms)),
            None => policy,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        config.into_policy()
    }
}
