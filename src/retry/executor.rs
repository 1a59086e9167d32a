//! The retry loop and the adapters built on it.
//!
//! Every retryable shape (value producer, transform, consumer, side effect)
//! is a thin wrapper around [`retry`] or [`retry_validated`]. Both drive the
//! same [`Attempts`] bookkeeping, which the async executor shares too.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use super::error::{Interrupted, RetryExhausted, ValidationFailed};
use super::policy::{RetryEvent, RetryPolicy};
use crate::error::{BoxError, Error};

/// Attempt counting and failure classification for one run of a retry loop.
#[derive(Debug)]
pub(crate) struct Attempts<'p> {
    policy: &'p RetryPolicy,
    start: Instant,
    attempt: u32,
    prev_delay: Option<Duration>,
}

impl<'p> Attempts<'p> {
    pub(crate) fn new(policy: &'p RetryPolicy) -> Self {
        Self {
            policy,
            start: Instant::now(),
            attempt: 0,
            prev_delay: None,
        }
    }

    pub(crate) fn begin(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }

    /// Decide what follows a failed attempt: `Ok(delay)` to wait and retry,
    /// `Err(terminal)` to stop.
    pub(crate) fn failed(&mut self, error: Error) -> Result<Duration, Error> {
        if error.is_interrupted() {
            return Err(error);
        }

        let next_delay = self.policy.delay_with_jitter(self.attempt - 1, self.prev_delay);

        self.policy.notify(&RetryEvent {
            attempt: self.attempt,
            error: &error,
            next_delay,
            elapsed: self.start.elapsed(),
        });

        match next_delay {
            Some(delay) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt = self.attempt,
                    max_attempts = self.policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, retrying"
                );
                self.prev_delay = Some(delay);
                Ok(delay)
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    attempts = self.attempt,
                    error = %error,
                    "retry attempts exhausted"
                );
                Err(Error::RetryExhausted(RetryExhausted::new(
                    error,
                    self.attempt,
                    self.policy.max_attempts(),
                    self.start.elapsed(),
                )))
            }
        }
    }

    pub(crate) fn interrupted(&self, error: Error) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(
            attempts = self.attempt,
            error = %error,
            "retry wait interrupted, aborting"
        );
        Error::Interrupted(Interrupted::new(error, self.attempt))
    }
}

pub(crate) fn reject<T: Debug>(value: &T) -> Error {
    Error::Validation(ValidationFailed::new(format!("{:?}", value)))
}

fn drive<T, F, V>(policy: &RetryPolicy, mut op: F, accept: V) -> Result<T, Error>
where
    F: FnMut() -> Result<T, Error>,
    V: Fn(&T) -> Result<(), Error>,
{
    let mut attempts = Attempts::new(policy);

    loop {
        attempts.begin();
        let error = match op().and_then(|value| accept(&value).map(|()| value)) {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let delay = attempts.failed(error.clone())?;
        if policy.sleeper().sleep(delay).is_err() {
            return Err(attempts.interrupted(error));
        }
    }
}

/// Run `op` until it succeeds or the policy's attempt bound is reached.
///
/// On success the value is returned as if no retry had happened. Once the
/// bound is reached the result is [`Error::RetryExhausted`] carrying the
/// **last** failure. No wait follows the final attempt.
///
/// With an unbounded policy (`max_attempts == 0`) this only returns on
/// success or interruption.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use trywise::{retry, RetryPolicy};
///
/// let policy = RetryPolicy::constant(Duration::from_millis(1), 5);
/// let mut calls = 0;
///
/// let value = retry::retry(&policy, || {
///     calls += 1;
///     if calls < 3 { Err("not yet") } else { Ok(7) }
/// });
///
/// assert_eq!(value, Ok(7));
/// assert_eq!(calls, 3);
/// ```
pub fn retry<T, E, F>(policy: &RetryPolicy, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
{
    drive(policy, || op().map_err(Error::operation), |_| Ok(()))
}

/// Like [`retry`], but a produced value only counts as success when
/// `validator` accepts it.
///
/// A rejected value is a failed attempt with an [`Error::Validation`]
/// cause, so exhaustion after rejections wraps that error. The value is
/// recorded by its `Debug` rendering, which any value can provide.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use trywise::{retry, RetryPolicy};
///
/// let policy = RetryPolicy::constant(Duration::ZERO, 3);
/// let mut readings = vec![4, 5, 6].into_iter();
///
/// let value = retry::retry_validated(
///     &policy,
///     || readings.next().ok_or("sensor offline"),
///     |reading| *reading > 4,
/// );
///
/// assert_eq!(value, Ok(5));
/// ```
pub fn retry_validated<T, E, F, P>(policy: &RetryPolicy, mut op: F, validator: P) -> Result<T, Error>
where
    T: Debug,
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
    P: Fn(&T) -> bool,
{
    drive(
        policy,
        || op().map_err(Error::operation),
        |value| {
            if validator(value) {
                Ok(())
            } else {
                Err(reject(value))
            }
        },
    )
}

/// Make a value producer retryable.
///
/// The returned closure runs the whole retry loop on every call; the policy
/// is shared by all calls.
pub fn supplier<T, E, F>(mut op: F, policy: RetryPolicy) -> impl FnMut() -> Result<T, Error>
where
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
{
    move || retry(&policy, &mut op)
}

/// Make a value producer retryable, accepting only values `validator` likes.
pub fn validating_supplier<T, E, F, P>(
    mut op: F,
    policy: RetryPolicy,
    validator: P,
) -> impl FnMut() -> Result<T, Error>
where
    T: Debug,
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
    P: Fn(&T) -> bool,
{
    move || retry_validated(&policy, &mut op, &validator)
}

/// Make a transform retryable. Each attempt receives its own clone of the
/// input.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use trywise::{retry, RetryPolicy};
///
/// let mut failures_left = 1;
/// let mut double = retry::function(
///     move |x: i32| {
///         if failures_left > 0 {
///             failures_left -= 1;
///             Err("hiccup")
///         } else {
///             Ok(x * 2)
///         }
///     },
///     RetryPolicy::constant(Duration::ZERO, 2),
/// );
///
/// assert_eq!(double(21), Ok(42));
/// ```
pub fn function<I, O, E, F>(mut op: F, policy: RetryPolicy) -> impl FnMut(I) -> Result<O, Error>
where
    I: Clone,
    F: FnMut(I) -> Result<O, E>,
    E: Into<BoxError>,
{
    move |input: I| retry(&policy, || op(input.clone()))
}

/// Make a transform retryable, accepting only outputs `validator` likes.
///
/// Extends validation, which the value-producer shape offers, to the
/// one-argument shape.
pub fn validating_function<I, O, E, F, P>(
    mut op: F,
    policy: RetryPolicy,
    validator: P,
) -> impl FnMut(I) -> Result<O, Error>
where
    I: Clone,
    O: Debug,
    F: FnMut(I) -> Result<O, E>,
    E: Into<BoxError>,
    P: Fn(&O) -> bool,
{
    move |input: I| retry_validated(&policy, || op(input.clone()), &validator)
}

/// Make a side effect that takes an input retryable.
pub fn consumer<I, E, F>(op: F, policy: RetryPolicy) -> impl FnMut(I) -> Result<(), Error>
where
    I: Clone,
    F: FnMut(I) -> Result<(), E>,
    E: Into<BoxError>,
{
    function(op, policy)
}

/// Make a side effect without input retryable.
pub fn runnable<E, F>(op: F, policy: RetryPolicy) -> impl FnMut() -> Result<(), Error>
where
    F: FnMut() -> Result<(), E>,
    E: Into<BoxError>,
{
    supplier(op, policy)
}
