//! Railway-style results for chaining fallible steps.
//!
//! [`Outcome<T>`] is either `Success(T)` or `Failure(Error)`. Combinators run
//! the next step only on success; a failure travels down the pipeline
//! untouched until [`recover`](Outcome::recover) turns it back into a value
//! or the caller inspects it.
//!
//! # Examples
//!
//! ```rust
//! use trywise::Outcome;
//!
//! let total = Outcome::run(|| "2".parse::<i32>())
//!     .map(|x| x + 1)
//!     .then_compose(|x| Outcome::success(x + 1));
//!
//! assert_eq!(total.get(), Ok(4));
//!
//! // A failing step short-circuits everything after it
//! let mut later_steps = 0;
//! let failed = Outcome::run(|| "two".parse::<i32>())
//!     .map(|x| { later_steps += 1; x + 1 })
//!     .then_compose(|x| Outcome::success(x + 1));
//!
//! assert!(failed.is_failure());
//! assert_eq!(later_steps, 0);
//! ```
//!
//! # Retrying a step
//!
//! Every step-taking combinator has a `*_retrying` overload that wraps the
//! step with a [`RetryPolicy`](crate::RetryPolicy) first; see
//! [`try_map_retrying`](Outcome::try_map_retrying) and friends.

use std::fmt;

use crate::error::{BoxError, Error};

mod retrying;

/// The result of one or more chained fallible steps.
///
/// Immutable: every combinator consumes `self` and returns a new outcome.
/// Two outcomes are equal when they are the same variant with equal payloads.
#[derive(Clone, Debug, PartialEq)]
#[must_use = "an Outcome may be a Failure that should be handled"]
pub enum Outcome<T> {
    /// The step produced a value.
    Success(T),
    /// The step failed.
    Failure(Error),
}

impl<T> Outcome<T> {
    // ========== Constructors ==========

    /// Create a successful outcome.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// assert!(Outcome::success(42).is_success());
    /// ```
    #[inline]
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    /// Create a failed outcome.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// let failed: Outcome<i32> = Outcome::failure("no route to host");
    /// assert!(failed.is_failure());
    /// ```
    #[inline]
    pub fn failure(error: impl Into<Error>) -> Self {
        Outcome::Failure(error.into())
    }

    /// Run a fallible operation, capturing its failure.
    ///
    /// A side effect is the special case `T = ()`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// assert_eq!(Outcome::run(|| "7".parse::<u8>()), Outcome::success(7));
    /// assert!(Outcome::run(|| "700".parse::<u8>()).is_failure());
    /// ```
    pub fn run<E, F>(op: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<BoxError>,
    {
        op().into()
    }

    /// Turn a fallible function into one that returns outcomes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// let mut parse = Outcome::lift(|s: &str| s.parse::<i32>());
    ///
    /// assert_eq!(parse("12"), Outcome::success(12));
    /// assert!(parse("twelve").is_failure());
    /// ```
    pub fn lift<U, E, F>(mut f: F) -> impl FnMut(U) -> Outcome<T>
    where
        F: FnMut(U) -> Result<T, E>,
        E: Into<BoxError>,
    {
        move |input| f(input).into()
    }

    /// Combine two outcomes with a function of both values.
    ///
    /// Succeeds only when both succeed. `a`'s failure wins over `b`'s, so
    /// when both failed the result carries `a`'s error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// let area = Outcome::combine(Outcome::success(3), Outcome::success(4), |w, h| w * h);
    /// assert_eq!(area, Outcome::success(12));
    ///
    /// let missing: Outcome<i32> = Outcome::failure("no width");
    /// let area = Outcome::combine(missing.clone(), Outcome::failure("no height"), |w: i32, h: i32| w * h);
    /// assert_eq!(area, missing);
    /// ```
    pub fn combine<U, V, F>(a: Outcome<U>, b: Outcome<V>, f: F) -> Self
    where
        F: FnOnce(U, V) -> T,
    {
        a.then_compose(|u| b.map(|v| f(u, v)))
    }

    /// Like [`combine`](Self::combine), with a fallible combining function.
    pub fn try_combine<U, V, E, F>(a: Outcome<U>, b: Outcome<V>, f: F) -> Self
    where
        F: FnOnce(U, V) -> Result<T, E>,
        E: Into<BoxError>,
    {
        a.then_compose(|u| b.try_map(|v| f(u, v)))
    }

    // ========== Predicates ==========

    /// Returns `true` if this is a `Success`.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns `true` if this is a `Failure`.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    // ========== Extractors ==========

    /// Take the value out, or report why there is none.
    ///
    /// A failure is never turned into a default: it comes back as
    /// [`Error::EmptyResult`] wrapping the original error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::{Error, Outcome};
    ///
    /// assert_eq!(Outcome::success(5).get(), Ok(5));
    ///
    /// let cause = Error::msg("quota exceeded");
    /// let err = Outcome::<i32>::Failure(cause.clone()).get().unwrap_err();
    /// assert_eq!(err, Error::EmptyResult(Box::new(cause)));
    /// ```
    pub fn get(self) -> Result<T, Error> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(Error::EmptyResult(Box::new(error))),
        }
    }

    /// Return the value or `default`.
    #[inline]
    pub fn get_or(self, default: T) -> T {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(_) => default,
        }
    }

    /// Return the value or compute a default.
    ///
    /// `default` only runs on failure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// let mut computed = false;
    /// let value = Outcome::success(1).get_or_else(|| { computed = true; 0 });
    ///
    /// assert_eq!(value, 1);
    /// assert!(!computed);
    /// ```
    #[inline]
    pub fn get_or_else<F>(self, default: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(_) => default(),
        }
    }

    /// Borrow the value, if any.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Borrow the error, if any.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Take the value, discarding any error.
    #[inline]
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Take the error, discarding any value.
    #[inline]
    pub fn into_error(self) -> Option<Error> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Convert to a standard `Result` without wrapping the error.
    #[inline]
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }

    // ========== Composition ==========

    /// Transform the value with a function that cannot fail.
    ///
    /// On failure `f` is not called and the failure is passed on unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// assert_eq!(Outcome::success(21).map(|x| x * 2), Outcome::success(42));
    /// ```
    #[inline]
    pub fn map<R, F>(self, f: F) -> Outcome<R>
    where
        F: FnOnce(T) -> R,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transform the value with a function that may fail.
    ///
    /// If `f` fails, the result is a failure carrying its error. On failure
    /// `f` is not called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// let parsed = Outcome::success("17").try_map(|s| s.parse::<i32>());
    /// assert_eq!(parsed, Outcome::success(17));
    ///
    /// let parsed = Outcome::success("x").try_map(|s| s.parse::<i32>());
    /// assert!(parsed.is_failure());
    /// ```
    pub fn try_map<R, E, F>(self, f: F) -> Outcome<R>
    where
        F: FnOnce(T) -> Result<R, E>,
        E: Into<BoxError>,
    {
        self.then_compose(|value| Outcome::run(|| f(value)))
    }

    /// Chain a step that itself returns an outcome (flatMap).
    ///
    /// The step's outcome is returned as is. On failure `f` is not called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// fn half(x: i32) -> Outcome<i32> {
    ///     if x % 2 == 0 { Outcome::success(x / 2) } else { Outcome::failure("odd") }
    /// }
    ///
    /// assert_eq!(Outcome::success(8).then_compose(half).then_compose(half), Outcome::success(2));
    /// assert!(Outcome::success(6).then_compose(half).then_compose(half).is_failure());
    /// ```
    #[inline]
    pub fn then_compose<R, F>(self, f: F) -> Outcome<R>
    where
        F: FnOnce(T) -> Outcome<R>,
    {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Run a side effect that ignores the value.
    ///
    /// Success of the effect yields `Success(())`; its failure becomes the
    /// outcome. On failure the effect is not run.
    pub fn then_run<E, F>(self, effect: F) -> Outcome<()>
    where
        F: FnOnce() -> Result<(), E>,
        E: Into<BoxError>,
    {
        self.then_compose(|_| Outcome::run(effect))
    }

    /// Hand the value to a side effect.
    ///
    /// Same short-circuiting as [`then_run`](Self::then_run).
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// let mut sent = Vec::new();
    /// let done = Outcome::success("hello").then_accept(|msg| {
    ///     sent.push(msg);
    ///     Ok::<_, &str>(())
    /// });
    ///
    /// assert_eq!(done, Outcome::success(()));
    /// assert_eq!(sent, vec!["hello"]);
    /// ```
    pub fn then_accept<E, F>(self, consumer: F) -> Outcome<()>
    where
        F: FnOnce(T) -> Result<(), E>,
        E: Into<BoxError>,
    {
        self.then_compose(|value| Outcome::run(|| consumer(value)))
    }

    /// Turn a failure into a value.
    ///
    /// A success is returned unchanged and `f` is not called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::Outcome;
    ///
    /// let failed: Outcome<String> = Outcome::failure("cache miss");
    /// let recovered = failed.recover(|e| format!("fallback after {}", e));
    ///
    /// assert_eq!(recovered, Outcome::success("fallback after cache miss".to_string()));
    /// ```
    #[inline]
    pub fn recover<F>(self, f: F) -> Outcome<T>
    where
        F: FnOnce(Error) -> T,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Success(f(error)),
        }
    }

    /// Turn a failure into a value with a function that may itself fail.
    ///
    /// If `f` fails, its error replaces the original one.
    pub fn try_recover<E, F>(self, f: F) -> Outcome<T>
    where
        F: FnOnce(Error) -> Result<T, E>,
        E: Into<BoxError>,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::run(|| f(error)),
        }
    }
}

impl<T> Outcome<Outcome<T>> {
    /// Flatten a nested outcome.
    #[inline]
    pub fn flatten(self) -> Outcome<T> {
        self.then_compose(|inner| inner)
    }
}

// ========== Trait Implementations ==========

impl<T, E> From<Result<T, E>> for Outcome<T>
where
    E: Into<BoxError>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(Error::operation(error)),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, Error> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}

impl<T: fmt::Display> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(value) => write!(f, "Success({})", value),
            Outcome::Failure(error) => write!(f, "Failure({})", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn boom() -> Error {
        Error::msg("boom")
    }

    #[test]
    fn test_constructors() {
        assert!(Outcome::success(1).is_success());
        assert!(Outcome::<i32>::failure(boom()).is_failure());
    }

    #[test]
    fn test_run_captures_failure() {
        let outcome: Outcome<i32> = Outcome::run(|| Err("bad input"));
        assert_eq!(outcome.error().map(|e| e.to_string()), Some("bad input".into()));
    }

    #[test]
    fn test_run_unit_side_effect() {
        let ran = Cell::new(false);
        let outcome = Outcome::run(|| {
            ran.set(true);
            Ok::<_, &str>(())
        });
        assert_eq!(outcome, Outcome::success(()));
        assert!(ran.get());
    }

    #[test]
    fn test_map_on_failure_is_not_called() {
        let err = boom();
        let calls = Cell::new(0);
        let outcome = Outcome::<i32>::Failure(err.clone()).map(|x| {
            calls.set(calls.get() + 1);
            x + 1
        });
        assert_eq!(outcome, Outcome::Failure(err));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_try_map_failure_is_captured() {
        let outcome = Outcome::success(1).try_map(|_| Err::<i32, _>("nope"));
        assert_eq!(outcome.error().unwrap().to_string(), "nope");
    }

    #[test]
    fn test_then_compose_returns_step_outcome() {
        let err = boom();
        let outcome = Outcome::success(1).then_compose(|_| Outcome::<i32>::Failure(err.clone()));
        assert_eq!(outcome, Outcome::Failure(err));
    }

    #[test]
    fn test_then_run_yields_unit() {
        assert_eq!(
            Outcome::success(5).then_run(|| Ok::<_, &str>(())),
            Outcome::success(())
        );
    }

    #[test]
    fn test_then_run_failure_becomes_outcome() {
        let outcome = Outcome::success(5).then_run(|| Err("disk full"));
        assert_eq!(outcome.error().unwrap().to_string(), "disk full");
    }

    #[test]
    fn test_then_run_short_circuits_with_original_error() {
        let err = boom();
        let ran = Cell::new(false);
        let outcome = Outcome::<i32>::Failure(err.clone()).then_run(|| {
            ran.set(true);
            Ok::<_, &str>(())
        });
        assert_eq!(outcome, Outcome::Failure(err));
        assert!(!ran.get());
    }

    #[test]
    fn test_then_accept_receives_value() {
        let seen = Cell::new(0);
        let outcome = Outcome::success(9).then_accept(|v| {
            seen.set(v);
            Ok::<_, &str>(())
        });
        assert_eq!(outcome, Outcome::success(()));
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn test_chain_on_failure_invokes_nothing() {
        let err = boom();
        let calls = Cell::new(0);
        let bump = || calls.set(calls.get() + 1);

        let outcome = Outcome::<i32>::Failure(err.clone())
            .map(|x| {
                bump();
                x
            })
            .then_compose(|x| {
                bump();
                Outcome::success(x)
            })
            .then_accept(|_| {
                bump();
                Ok::<_, &str>(())
            })
            .then_run(|| {
                bump();
                Ok::<_, &str>(())
            });

        assert_eq!(outcome, Outcome::Failure(err));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_get_never_defaults() {
        let err = boom();
        match Outcome::<i32>::Failure(err.clone()).get() {
            Err(Error::EmptyResult(cause)) => assert_eq!(*cause, err),
            other => panic!("expected EmptyResult, got {:?}", other),
        }
    }

    #[test]
    fn test_get_or() {
        assert_eq!(Outcome::success(1).get_or(0), 1);
        assert_eq!(Outcome::<i32>::failure(boom()).get_or(0), 0);
    }

    #[test]
    fn test_get_or_else_is_lazy() {
        let evaluated = Cell::new(false);
        let default = || {
            evaluated.set(true);
            0
        };
        assert_eq!(Outcome::success(3).get_or_else(default), 3);
        assert!(!evaluated.get());

        assert_eq!(Outcome::<i32>::failure(boom()).get_or_else(default), 0);
        assert!(evaluated.get());
    }

    #[test]
    fn test_recover_receives_the_error() {
        let err = boom();
        let outcome = Outcome::<String>::Failure(err).recover(|e| e.to_string());
        assert_eq!(outcome, Outcome::success("boom".to_string()));
    }

    #[test]
    fn test_recover_on_success_is_identity() {
        let called = Cell::new(false);
        let outcome = Outcome::success(7).recover(|_| {
            called.set(true);
            0
        });
        assert_eq!(outcome, Outcome::success(7));
        assert!(!called.get());
    }

    #[test]
    fn test_try_recover_failure_replaces_error() {
        let outcome = Outcome::<i32>::failure(boom()).try_recover(|_| Err("still broken"));
        assert_eq!(outcome.error().unwrap().to_string(), "still broken");
    }

    #[test]
    fn test_try_recover_success() {
        let outcome = Outcome::<i32>::failure(boom()).try_recover(|_| Ok::<_, &str>(1));
        assert_eq!(outcome, Outcome::success(1));
    }

    #[test]
    fn test_combine_precedence() {
        let e1 = Error::msg("first");
        let e2 = Error::msg("second");

        let both = Outcome::<i32>::combine(
            Outcome::<i32>::Failure(e1.clone()),
            Outcome::<i32>::Failure(e2.clone()),
            |a, b| a + b,
        );
        assert_eq!(both, Outcome::Failure(e1.clone()));

        let only_b = Outcome::<i32>::combine(
            Outcome::success(1),
            Outcome::<i32>::Failure(e2.clone()),
            |a, b| a + b,
        );
        assert_eq!(only_b, Outcome::Failure(e2));

        let neither = Outcome::<i32>::combine(Outcome::success(1), Outcome::success(2), |a, b| a + b);
        assert_eq!(neither, Outcome::success(3));
    }

    #[test]
    fn test_try_combine_wraps_function_error() {
        let outcome: Outcome<i32> =
            Outcome::try_combine(Outcome::success(1), Outcome::success(0), |a: i32, b: i32| {
                a.checked_div(b).ok_or("division by zero")
            });
        assert_eq!(outcome.error().unwrap().to_string(), "division by zero");
    }

    #[test]
    fn test_flatten() {
        let nested = Outcome::success(Outcome::success(1));
        assert_eq!(nested.flatten(), Outcome::success(1));

        let err = boom();
        let nested: Outcome<Outcome<i32>> = Outcome::success(Outcome::Failure(err.clone()));
        assert_eq!(nested.flatten(), Outcome::Failure(err));
    }

    #[test]
    fn test_result_conversion() {
        let outcome: Outcome<i32> = Ok::<_, &str>(1).into();
        assert_eq!(outcome, Outcome::success(1));

        let err = boom();
        let result: Result<i32, Error> = Outcome::<i32>::Failure(err.clone()).into();
        assert_eq!(result, Err(err));
    }

    #[test]
    fn test_result_conversion_does_not_nest_errors() {
        let err = boom();
        let outcome: Outcome<i32> = Err::<i32, _>(err.clone()).into();
        assert_eq!(outcome, Outcome::Failure(err));
    }

    #[test]
    fn test_reraised_operation_error_keeps_identity() {
        let first: Outcome<i32> = Outcome::run(|| "4x".parse::<i32>());
        let op = match first.error() {
            Some(Error::Operation(op)) => op.clone(),
            other => panic!("expected operation error, got {:?}", other),
        };

        let second: Outcome<i32> = Outcome::run(|| Err(op));

        assert_eq!(second, first);
        assert!(second
            .error()
            .and_then(|e| e.downcast_ref::<std::num::ParseIntError>())
            .is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(Outcome::success(4).to_string(), "Success(4)");
        assert_eq!(Outcome::<i32>::failure(boom()).to_string(), "Failure(boom)");
    }

    #[test]
    fn test_accessors() {
        let ok = Outcome::success(2);
        assert_eq!(ok.value(), Some(&2));
        assert!(ok.error().is_none());
        assert_eq!(ok.clone().ok(), Some(2));
        assert_eq!(ok.into_error(), None);

        let err = boom();
        let failed = Outcome::<i32>::Failure(err.clone());
        assert_eq!(failed.value(), None);
        assert_eq!(failed.clone().into_result(), Err(err.clone()));
        assert_eq!(failed.into_error(), Some(err));
    }

    #[test]
    fn test_lift() {
        let mut checked_sqrt = Outcome::lift(|x: f64| {
            if x >= 0.0 {
                Ok(x.sqrt())
            } else {
                Err("negative")
            }
        });
        assert_eq!(checked_sqrt(9.0), Outcome::success(3.0));
        assert!(checked_sqrt(-1.0).is_failure());
    }
}
