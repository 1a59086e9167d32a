//! `*_retrying` overloads: the same combinators, with the step wrapped in a
//! retry loop first.
//!
//! Each overload builds the retried step with [`crate::retry`] and hands it
//! to the plain combinator, so short-circuiting and error capture behave
//! exactly as without a policy. A step that exhausts its policy fails the
//! outcome with [`Error::RetryExhausted`](crate::Error::RetryExhausted).

use std::fmt::Debug;

use super::Outcome;
use crate::error::BoxError;
use crate::retry::{self, RetryPolicy};

impl<T> Outcome<T> {
    /// [`run`](Self::run), retrying `op` under `policy`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use trywise::{Outcome, RetryPolicy};
    ///
    /// let policy = RetryPolicy::constant(Duration::from_millis(1), 3);
    /// let mut calls = 0;
    ///
    /// let outcome = Outcome::run_retrying(
    ///     || {
    ///         calls += 1;
    ///         if calls < 3 { Err("connection refused") } else { Ok(calls) }
    ///     },
    ///     &policy,
    /// );
    ///
    /// assert_eq!(outcome, Outcome::success(3));
    /// ```
    pub fn run_retrying<E, F>(mut op: F, policy: &RetryPolicy) -> Self
    where
        F: FnMut() -> Result<T, E>,
        E: Into<BoxError>,
    {
        Outcome::run(|| retry::retry(policy, &mut op))
    }

    /// [`run`](Self::run) with a retry loop that only accepts values
    /// `validator` likes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use trywise::{Outcome, RetryPolicy};
    ///
    /// let policy = RetryPolicy::constant(Duration::ZERO, 5);
    /// let mut next = 3;
    ///
    /// let outcome = Outcome::run_validated(
    ///     || { next += 1; Ok::<_, &str>(next) },
    ///     &policy,
    ///     |n| n % 5 == 0,
    /// );
    ///
    /// assert_eq!(outcome, Outcome::success(5));
    /// ```
    pub fn run_validated<E, F, P>(mut op: F, policy: &RetryPolicy, validator: P) -> Self
    where
        T: Debug,
        F: FnMut() -> Result<T, E>,
        E: Into<BoxError>,
        P: Fn(&T) -> bool,
    {
        Outcome::run(|| retry::retry_validated(policy, &mut op, validator))
    }

    /// [`lift`](Self::lift), retrying every call of `f` under `policy`.
    ///
    /// The policy is cloned into the returned function.
    pub fn lift_retrying<U, E, F>(f: F, policy: &RetryPolicy) -> impl FnMut(U) -> Outcome<T>
    where
        U: Clone,
        F: FnMut(U) -> Result<T, E>,
        E: Into<BoxError>,
    {
        Outcome::lift(retry::function(f, policy.clone()))
    }

    /// [`try_map`](Self::try_map), retrying `f` under `policy`. Each attempt
    /// gets its own clone of the value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use trywise::{Outcome, RetryPolicy};
    ///
    /// let policy = RetryPolicy::constant(Duration::from_millis(10), 5);
    /// let mut flaky = 2;
    ///
    /// let outcome = Outcome::success(2).try_map_retrying(
    ///     |x| {
    ///         if flaky > 0 { flaky -= 1; Err("timeout") } else { Ok(x + 1) }
    ///     },
    ///     &policy,
    /// );
    ///
    /// assert_eq!(outcome, Outcome::success(3));
    /// ```
    pub fn try_map_retrying<R, E, F>(self, mut f: F, policy: &RetryPolicy) -> Outcome<R>
    where
        T: Clone,
        F: FnMut(T) -> Result<R, E>,
        E: Into<BoxError>,
    {
        self.try_map(|value| retry::retry(policy, || f(value.clone())))
    }

    /// [`then_compose`](Self::then_compose), retrying `f` under `policy`.
    ///
    /// A `Failure` returned by `f` counts as a failed attempt.
    pub fn then_compose_retrying<R, F>(self, mut f: F, policy: &RetryPolicy) -> Outcome<R>
    where
        T: Clone,
        F: FnMut(T) -> Outcome<R>,
    {
        self.then_compose(|value| {
            Outcome::run(|| retry::retry(policy, || f(value.clone()).into_result()))
        })
    }

    /// [`then_run`](Self::then_run), retrying `effect` under `policy`.
    pub fn then_run_retrying<E, F>(self, mut effect: F, policy: &RetryPolicy) -> Outcome<()>
    where
        F: FnMut() -> Result<(), E>,
        E: Into<BoxError>,
    {
        self.then_run(|| retry::retry(policy, &mut effect))
    }

    /// [`then_accept`](Self::then_accept), retrying `consumer` under
    /// `policy`. Each attempt gets its own clone of the value.
    pub fn then_accept_retrying<E, F>(self, mut consumer: F, policy: &RetryPolicy) -> Outcome<()>
    where
        T: Clone,
        F: FnMut(T) -> Result<(), E>,
        E: Into<BoxError>,
    {
        self.then_accept(|value| retry::retry(policy, || consumer(value.clone())))
    }
}
