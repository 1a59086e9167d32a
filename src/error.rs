//! The error taxonomy shared by [`Outcome`](crate::Outcome) and the retry engine.
//!
//! Every failure that flows through a pipeline is an [`Error`]. Caller code
//! fails with whatever error type it likes; the failure is captured as an
//! [`Error::Operation`] and keeps its original type for later inspection via
//! [`Error::downcast_ref`]. The remaining variants are produced by the crate
//! itself and always carry their cause explicitly:
//!
//! ```text
//! Operation ──(bound reached)──> RetryExhausted { final_error: Operation | Validation }
//!     │                                  │
//!     └──────(get() on a failure)────────┴──> EmptyResult(cause)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use trywise::{Error, Outcome};
//!
//! let outcome: Outcome<i32> = Outcome::run(|| "42x".parse::<i32>());
//!
//! let err = outcome.get().unwrap_err();
//! assert!(err.is_empty_result());
//! assert!(err.root_cause().downcast_ref::<std::num::ParseIntError>().is_some());
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::retry::{Interrupted, RetryExhausted, ValidationFailed};

/// A boxed, thread-safe error; the currency caller operations fail with.
///
/// `&str`, `String` and every `std::error::Error + Send + Sync + 'static`
/// convert into it.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A failure raised by caller-supplied code.
///
/// The wrapped error is shared, so cloning is cheap. Equality is identity:
/// clones of one failure compare equal, two separately raised failures never
/// do, even when their messages match.
#[derive(Clone)]
pub struct OperationError {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl OperationError {
    /// Wrap a caller error.
    pub fn new<E: Into<BoxError>>(error: E) -> Self {
        Self {
            inner: Arc::from(error.into()),
        }
    }

    /// Borrow the wrapped error.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    /// Attempt to view the wrapped error as its concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl fmt::Debug for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl PartialEq for OperationError {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl StdError for OperationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Every way a step of a pipeline can fail.
///
/// Cloning is cheap: caller errors are shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Caller-supplied code failed.
    Operation(OperationError),
    /// A validating retry rejected the produced value.
    Validation(ValidationFailed),
    /// Every permitted attempt failed.
    RetryExhausted(RetryExhausted),
    /// The wait between two attempts was interrupted. Never retried.
    Interrupted(Interrupted),
    /// A value was demanded from a failed outcome.
    EmptyResult(Box<Error>),
}

impl Error {
    /// Capture a caller failure.
    ///
    /// If the boxed error already is an [`Error`] or an [`OperationError`] it
    /// is unwrapped rather than nested, so a retried step that fails inside
    /// another step keeps its place in the taxonomy, and a re-raised caller
    /// failure stays equal to the original.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trywise::Error;
    ///
    /// let err = Error::operation("disk full");
    /// assert!(err.is_operation());
    /// assert_eq!(err.to_string(), "disk full");
    ///
    /// // Already an `Error` (or an `OperationError`): no extra layer.
    /// let same = Error::operation(err.clone());
    /// assert_eq!(same, err);
    /// ```
    pub fn operation<E: Into<BoxError>>(error: E) -> Self {
        Self::from_boxed(error.into())
    }

    /// Capture a caller failure from its message.
    pub fn msg<M: fmt::Display>(message: M) -> Self {
        Self::Operation(OperationError::new(message.to_string()))
    }

    pub(crate) fn from_boxed(error: BoxError) -> Self {
        let error = match error.downcast::<Error>() {
            Ok(error) => return *error,
            Err(other) => other,
        };
        match error.downcast::<OperationError>() {
            Ok(op) => Self::Operation(*op),
            Err(other) => Self::Operation(OperationError {
                inner: Arc::from(other),
            }),
        }
    }

    /// Returns `true` for a caller failure.
    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// Returns `true` for a rejected value.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` when a retry bound was reached.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted(_))
    }

    /// Returns `true` when a retry wait was interrupted.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }

    /// Returns `true` when a value was demanded from a failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult(_))
    }

    /// The error this one wraps, if any.
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::Operation(_) | Self::Validation(_) => None,
            Self::RetryExhausted(exhausted) => Some(exhausted.error()),
            Self::Interrupted(interrupted) => Some(interrupted.error()),
            Self::EmptyResult(cause) => Some(cause),
        }
    }

    /// Follow [`cause`](Self::cause) to the innermost error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use trywise::{retry, Error, RetryPolicy};
    ///
    /// let policy = RetryPolicy::constant(Duration::ZERO, 2);
    /// let err = retry::retry(&policy, || Err::<(), _>("down")).unwrap_err();
    ///
    /// assert!(err.is_retry_exhausted());
    /// assert_eq!(err.root_cause().to_string(), "down");
    /// ```
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }

    /// View the caller's original error as its concrete type.
    ///
    /// Only a [`Error::Operation`] can match; wrappers are not looked through,
    /// use [`root_cause`](Self::root_cause) first for that.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Operation(op) => op.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(e) => write!(f, "{}", e),
            Self::Validation(e) => write!(f, "{}", e),
            Self::RetryExhausted(e) => write!(f, "{}", e),
            Self::Interrupted(e) => write!(f, "{}", e),
            Self::EmptyResult(cause) => write!(f, "no value present: {}", cause),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            // transparent: the caller error speaks for itself
            Self::Operation(e) => e.source(),
            Self::Validation(_) => None,
            Self::RetryExhausted(e) => Some(e.error()),
            Self::Interrupted(e) => Some(e.error()),
            Self::EmptyResult(cause) => Some(&**cause),
        }
    }
}

impl From<OperationError> for Error {
    fn from(error: OperationError) -> Self {
        Self::Operation(error)
    }
}

impl From<ValidationFailed> for Error {
    fn from(error: ValidationFailed) -> Self {
        Self::Validation(error)
    }
}

impl From<RetryExhausted> for Error {
    fn from(error: RetryExhausted) -> Self {
        Self::RetryExhausted(error)
    }
}

impl From<Interrupted> for Error {
    fn from(error: Interrupted) -> Self {
        Self::Interrupted(error)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::Operation(OperationError::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct Timeout(u32);

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "timed out after {}s", self.0)
        }
    }

    impl StdError for Timeout {}

    #[test]
    fn operation_error_equality_is_identity() {
        let a = Error::msg("boom");
        let b = Error::msg("boom");

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn operation_keeps_concrete_type() {
        let err = Error::operation(Timeout(3));
        assert_eq!(err.downcast_ref::<Timeout>(), Some(&Timeout(3)));
        assert_eq!(err.to_string(), "timed out after 3s");
    }

    #[test]
    fn operation_does_not_nest_crate_errors() {
        let inner = Error::from(ValidationFailed::new("4"));
        let wrapped = Error::operation(inner.clone());
        assert_eq!(wrapped, inner);
        assert!(wrapped.is_validation());
    }

    #[test]
    fn operation_does_not_rewrap_operation_errors() {
        let parse_err = "4x".parse::<i32>().unwrap_err();
        let original = Error::operation(parse_err);
        let op = match &original {
            Error::Operation(op) => op.clone(),
            other => panic!("expected operation error, got {:?}", other),
        };

        let reraised = Error::operation(op);

        assert_eq!(reraised, original);
        assert!(reraised
            .downcast_ref::<std::num::ParseIntError>()
            .is_some());
    }

    #[test]
    fn empty_result_points_at_cause() {
        let cause = Error::msg("boom");
        let err = Error::EmptyResult(Box::new(cause.clone()));

        assert_eq!(err.cause(), Some(&cause));
        assert_eq!(err.to_string(), "no value present: boom");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("boom".to_string())
        );
    }

    #[test]
    fn root_cause_walks_the_chain() {
        let cause = Error::msg("boom");
        let exhausted = Error::from(RetryExhausted::new(
            cause.clone(),
            3,
            3,
            Duration::from_millis(5),
        ));
        let err = Error::EmptyResult(Box::new(exhausted));

        assert_eq!(err.root_cause(), &cause);
        assert!(err.downcast_ref::<Timeout>().is_none());
    }

    #[test]
    fn predicates_match_variants() {
        assert!(Error::msg("x").is_operation());
        assert!(Error::from(ValidationFailed::new("1")).is_validation());
        assert!(Error::from(Interrupted::new(Error::msg("x"), 1)).is_interrupted());
        assert!(!Error::msg("x").is_retry_exhausted());
    }
}
