//! # Trywise
//!
//! Railway-style error handling with per-step retries.
//!
//! ## Philosophy
//!
//! A pipeline is a chain of fallible steps. **Trywise** keeps the happy path
//! linear and lets failures ride along:
//! - [`Outcome`] is either a value or an [`Error`]; combinators run the next
//!   step only on success.
//! - Any step can be handed a [`RetryPolicy`]; transient failures are retried
//!   with backoff, and the pipeline only sees the final verdict.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::time::Duration;
//! use trywise::{Outcome, RetryPolicy};
//!
//! let policy = RetryPolicy::constant(Duration::from_millis(10), 5);
//! let mut hiccups = 2;
//!
//! let result = Outcome::run(|| Ok::<_, &str>(2))
//!     .try_map_retrying(
//!         |x| {
//!             if hiccups > 0 { hiccups -= 1; Err("service unavailable") } else { Ok(x + 1) }
//!         },
//!         &policy,
//!     )
//!     .then_compose(|x| Outcome::success(x + 1));
//!
//! assert_eq!(result.get(), Ok(4));
//! ```
//!
//! ## Failures
//!
//! Errors raised by caller code are kept, type and all, as
//! [`Error::Operation`]. The crate adds its own variants for rejected values,
//! exhausted and interrupted retries, and for demanding a value from a
//! failure; see [`error`].
//!
//! ## Features
//!
//! - `async`: [`retry::retry_async`] on top of `tokio`
//! - `tracing`: attempt/exhaustion/interruption events through `tracing`
//! - `jitter`: randomised backoff via `rand`
//! - `serde`: (de)serialisable [`retry::RetryConfig`]
//! - `proptest`: `Arbitrary` for [`Outcome`]
//!
//! For a runnable pipeline, see `demos/pipeline.rs`.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod outcome;
pub mod retry;
pub mod testing;

// Re-exports
pub use error::{BoxError, Error, OperationError};
pub use outcome::Outcome;
pub use retry::RetryPolicy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{BoxError, Error};
    pub use crate::outcome::Outcome;
    pub use crate::retry::{Backoff, RetryPolicy};
}
