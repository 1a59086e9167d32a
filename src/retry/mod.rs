//! Retry engine for individual pipeline steps.
//!
//! A [`RetryPolicy`] is pure data: a backoff, an attempt bound and a few
//! knobs. The executor runs one control loop for every operation shape:
//!
//! ```text
//! attempt = 0
//! loop:
//!     attempt += 1
//!     run the operation (and the validator, if any)
//!     success            -> return the value
//!     interrupted        -> return the interruption, untouched
//!     bound reached      -> return RetryExhausted(last failure)
//!     otherwise          -> wait backoff(attempt), go again
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use trywise::{retry, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::exponential(Duration::from_millis(1), 4);
//! let mut calls = 0;
//!
//! let value = retry::retry(&policy, || {
//!     calls += 1;
//!     if calls < 3 { Err("connection reset") } else { Ok("payload") }
//! });
//!
//! assert_eq!(value, Ok("payload"));
//! ```
//!
//! # Operation shapes
//!
//! - [`supplier`] / [`validating_supplier`]: `FnMut() -> Result<T, E>`
//! - [`function`] / [`validating_function`]: `FnMut(I) -> Result<O, E>`
//! - [`consumer`]: `FnMut(I) -> Result<(), E>`
//! - [`runnable`]: `FnMut() -> Result<(), E>`
//!
//! Each returns a closure failing with [`Error`](crate::Error), ready to be
//! handed to an [`Outcome`](crate::Outcome) combinator.
//!
//! # Waiting
//!
//! Waits go through a [`Sleeper`]. The default blocks the thread; an
//! [`InterruptibleSleeper`] lets another thread abort the loop, which then
//! fails with [`Error::Interrupted`](crate::Error::Interrupted).

mod config;
mod error;
mod executor;
#[cfg(feature = "async")]
mod future;
mod policy;
mod sleeper;

pub use config::{BackoffConfig, RetryConfig};
pub use error::{Interrupted, RetryExhausted, ValidationFailed};
pub use executor::{
    consumer, function, retry, retry_validated, runnable, supplier, validating_function,
    validating_supplier,
};
#[cfg(feature = "async")]
pub use future::{retry_async, retry_async_validated};
pub use policy::{Backoff, JitterStrategy, RetryEvent, RetryPolicy};
pub use sleeper::{
    InstantSleeper, InterruptibleSleeper, SleepInterrupted, Sleeper, ThreadSleeper,
    TrackingSleeper,
};
