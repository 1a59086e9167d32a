//! Testing utilities for code built on [`Outcome`](crate::Outcome) and the
//! retry engine.
//!
//! This module provides assertion macros, a scripted flaky operation for
//! exercising retry policies, and property-based testing support.
//!
//! # Examples
//!
//! ## Assertion Macros
//!
//! ```rust
//! use trywise::{Outcome, assert_success, assert_failure};
//!
//! let value = assert_success!(Outcome::success(42));
//! assert_eq!(value, 42);
//!
//! let error = assert_failure!(Outcome::<i32>::failure("boom"));
//! assert_eq!(error.to_string(), "boom");
//! ```
//!
//! ## Scripted Operations
//!
//! ```rust
//! use std::time::Duration;
//! use trywise::testing::Script;
//! use trywise::{retry, RetryPolicy};
//!
//! let script = Script::failing_then(2, "ready");
//! let policy = RetryPolicy::constant(Duration::ZERO, 3);
//!
//! assert_eq!(retry::retry(&policy, || script.call()), Ok("ready"));
//! assert_eq!(script.calls(), 3);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

/// A fallible operation that plays back a fixed list of results.
///
/// Call `n` returns step `n`; once the steps run out the last one repeats.
/// Calls are counted, so tests can check how often a retry loop ran the
/// operation. `call` takes `&self`, which lets one script be shared by
/// several closures.
#[derive(Debug)]
pub struct Script<T> {
    steps: Vec<Result<T, String>>,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    /// Play back `steps` in order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trywise::testing::Script;
    ///
    /// let script = Script::new(vec![Ok(4), Err("offline".to_string()), Ok(6)]);
    ///
    /// assert_eq!(script.call(), Ok(4));
    /// assert_eq!(script.call(), Err("offline".to_string()));
    /// assert_eq!(script.call(), Ok(6));
    /// assert_eq!(script.call(), Ok(6));
    /// ```
    pub fn new(steps: Vec<Result<T, String>>) -> Self {
        assert!(!steps.is_empty(), "a script needs at least one step");
        Self {
            steps,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail `failures` times with `"attempt <n> failed"`, then return
    /// `value` forever.
    pub fn failing_then(failures: usize, value: T) -> Self {
        let mut steps: Vec<Result<T, String>> = (1..=failures)
            .map(|n| Err(format!("attempt {} failed", n)))
            .collect();
        steps.push(Ok(value));
        Self::new(steps)
    }

    /// Run the next step.
    pub fn call(&self) -> Result<T, String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = n.min(self.steps.len() - 1);
        self.steps[step].clone()
    }

    /// How many times [`call`](Self::call) ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Assert that an outcome succeeded, yielding its value.
///
/// With a second argument the value is also compared against it.
///
/// # Example
///
/// ```rust
/// use trywise::{Outcome, assert_success};
///
/// assert_success!(Outcome::success(42), 42);
/// ```
#[macro_export]
macro_rules! assert_success {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Success(value) => value,
            $crate::Outcome::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
    ($outcome:expr, $expected:expr) => {
        assert_eq!($crate::assert_success!($outcome), $expected)
    };
}

/// Assert that an outcome failed, yielding its [`Error`](crate::Error).
///
/// # Example
///
/// ```rust
/// use trywise::{Outcome, assert_failure};
///
/// let error = assert_failure!(Outcome::<i32>::failure("boom"));
/// assert!(error.is_operation());
/// ```
#[macro_export]
macro_rules! assert_failure {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Failure(e) => e,
            $crate::Outcome::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that an outcome failed with an error matching a pattern.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use trywise::{Error, Outcome, RetryPolicy, assert_failure_matches};
///
/// let policy = RetryPolicy::constant(Duration::ZERO, 2);
/// let outcome = Outcome::run_retrying(|| Err::<(), _>("down"), &policy);
///
/// assert_failure_matches!(outcome, Error::RetryExhausted(e) if e.attempts == 2);
/// ```
#[macro_export]
macro_rules! assert_failure_matches {
    ($outcome:expr, $pattern:pat $(if $guard:expr)? $(,)?) => {
        match $crate::assert_failure!($outcome) {
            $pattern $(if $guard)? => {}
            other => {
                panic!(
                    "Expected Failure matching {}, got Failure: {:?}",
                    stringify!($pattern),
                    other
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<T> Arbitrary for crate::Outcome<T>
where
    T: Arbitrary + 'static,
{
    type Parameters = T::Parameters;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            any_with::<T>(args).prop_map(crate::Outcome::success),
            "[a-z ]{1,24}".prop_map(|msg| crate::Outcome::<T>::failure(crate::Error::msg(msg))),
        ]
        .boxed()
    }
}
