//! Async retry, for steps that are futures.
//!
//! Same attempt counting, validation and error wrapping as the blocking
//! loop; only the wait differs (`tokio::time::sleep`). The configured
//! [`Sleeper`](super::Sleeper) is not consulted here. To cancel, drop the
//! future.

use std::fmt::Debug;
use std::future::Future;

use super::executor::{reject, Attempts};
use super::policy::RetryPolicy;
use crate::error::{BoxError, Error};

/// Retry an async operation using a factory function.
///
/// Each attempt creates a fresh future via the factory, since a future is
/// consumed by awaiting it.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use trywise::{retry, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::constant(Duration::from_millis(1), 3);
/// let mut calls = 0;
///
/// let value = retry::retry_async(&policy, || {
///     calls += 1;
///     let n = calls;
///     async move { if n < 2 { Err("warming up") } else { Ok(n) } }
/// })
/// .await;
///
/// assert_eq!(value, Ok(2));
/// # });
/// ```
pub async fn retry_async<T, E, F, Fut>(policy: &RetryPolicy, make_future: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    drive_async(policy, make_future, |_: &T| Ok(())).await
}

/// Async counterpart of [`retry_validated`](super::retry_validated).
pub async fn retry_async_validated<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    make_future: F,
    validator: P,
) -> Result<T, Error>
where
    T: Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
    P: Fn(&T) -> bool,
{
    drive_async(policy, make_future, |value: &T| {
        if validator(value) {
            Ok(())
        } else {
            Err(reject(value))
        }
    })
    .await
}

async fn drive_async<T, E, F, Fut, V>(
    policy: &RetryPolicy,
    mut make_future: F,
    accept: V,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
    V: Fn(&T) -> Result<(), Error>,
{
    let mut attempts = Attempts::new(policy);

    loop {
        attempts.begin();
        let outcome = make_future().await.map_err(Error::operation);
        let error = match outcome.and_then(|value| accept(&value).map(|()| value)) {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let delay = attempts.failed(error)?;
        tokio::time::sleep(delay).await;
    }
}
