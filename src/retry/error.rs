//! Error types for retry operations.

use std::time::Duration;

use crate::error::Error;

/// Error returned when all retry attempts are exhausted.
///
/// Contains the failure of the final attempt along with metadata about the
/// retry sequence. Earlier failures are discarded.
///
/// # Examples
///
/// ```rust
/// use trywise::{retry, Error, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::constant(Duration::from_millis(1), 3);
///
/// match retry::retry(&policy, || Err::<(), _>("always fails")) {
///     Err(Error::RetryExhausted(exhausted)) => {
///         assert_eq!(exhausted.error().to_string(), "always fails");
///         assert_eq!(exhausted.attempts, 3);
///         assert_eq!(exhausted.max_attempts, 3);
///     }
///     other => panic!("Expected exhaustion, got {:?}", other),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RetryExhausted {
    /// The error from the final attempt.
    pub final_error: Box<Error>,
    /// Total number of attempts made.
    pub attempts: u32,
    /// The bound that was reached.
    pub max_attempts: u32,
    /// Total time spent retrying.
    pub total_duration: Duration,
}

impl RetryExhausted {
    /// Create a new RetryExhausted error.
    pub fn new(final_error: Error, attempts: u32, max_attempts: u32, total_duration: Duration) -> Self {
        Self {
            final_error: Box::new(final_error),
            attempts,
            max_attempts,
            total_duration,
        }
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> Error {
        *self.final_error
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &Error {
        &self.final_error
    }
}

// Timing is not part of identity.
impl PartialEq for RetryExhausted {
    fn eq(&self, other: &Self) -> bool {
        self.attempts == other.attempts
            && self.max_attempts == other.max_attempts
            && self.final_error == other.final_error
    }
}

impl std::fmt::Display for RetryExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unable to perform the task within {} attempts because: {}",
            self.max_attempts, self.final_error
        )
    }
}

impl std::error::Error for RetryExhausted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.final_error)
    }
}

/// A produced value was rejected by the validator of a validating retry.
///
/// The value is recorded through its `Debug` rendering, so a rejected string
/// appears quoted: `supplied value '"abc"' doesn't satisfy the condition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailed {
    value: String,
}

impl ValidationFailed {
    /// Record the rejected value by its rendering.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The `Debug` rendering of the rejected value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for ValidationFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "supplied value '{}' doesn't satisfy the condition",
            self.value
        )
    }
}

impl std::error::Error for ValidationFailed {}

/// The wait between two attempts was interrupted.
///
/// Interruption aborts the retry loop: it is never treated as an ordinary
/// failure, so neither the loop that slept nor any enclosing retry retries it.
#[derive(Debug, Clone, PartialEq)]
pub struct Interrupted {
    /// Attempts made before the interruption.
    pub attempts: u32,
    /// The failure that caused the interrupted wait.
    pub last_error: Box<Error>,
}

impl Interrupted {
    /// Create a new Interrupted error.
    pub fn new(last_error: Error, attempts: u32) -> Self {
        Self {
            attempts,
            last_error: Box::new(last_error),
        }
    }

    /// Get a reference to the failure that preceded the interruption.
    pub fn error(&self) -> &Error {
        &self.last_error
    }
}

impl std::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry interrupted after {} attempts; last failure: {}",
            self.attempts, self.last_error
        )
    }
}

impl std::error::Error for Interrupted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.last_error)
    }
}
