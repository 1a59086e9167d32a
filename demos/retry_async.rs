//! Async Retry Example
//!
//! Demonstrates retrying futures with the `async` feature.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use trywise::retry::{retry_async, retry_async_validated};
use trywise::{Outcome, RetryPolicy};

/// Example 1: a request that times out twice.
async fn example_basic_retry() {
    println!("\n=== Example 1: Basic Async Retry ===");

    let attempts = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::exponential(Duration::from_millis(20), 5);

    let result = retry_async(&policy, || {
        let attempts = attempts.clone();
        async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  Attempt {}", n);
            if n < 3 {
                Err("request timed out")
            } else {
                Ok("200 OK")
            }
        }
    })
    .await;

    println!("Result: {}", Outcome::from(result));
}

/// Example 2: wait until a job reports completion.
async fn example_poll_until_done() {
    println!("\n=== Example 2: Polling ===");

    let progress = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::constant(Duration::from_millis(10), 0);

    let result = retry_async_validated(
        &policy,
        || {
            let progress = progress.clone();
            async move { Ok::<_, &str>(progress.fetch_add(25, Ordering::SeqCst) + 25) }
        },
        |percent| *percent >= 100,
    )
    .await;

    println!("Job finished at {:?}%", result);
}

#[tokio::main]
async fn main() {
    example_basic_retry().await;
    example_poll_until_done().await;
}
