//! Pipeline Example
//!
//! Demonstrates chaining fallible steps with per-step retries.
//! Shows practical patterns including:
//! - The basic pipeline: run, retried map, compose
//! - Validating retries that wait for an acceptable value
//! - Observing retries with a hook
//! - Recovering from an exhausted step

use std::time::Duration;

use trywise::prelude::*;
use trywise::retry::RetryEvent;

// ==================== Basic Pipeline ====================

/// Example 1: a step that needs a few attempts before it succeeds.
fn example_basic_pipeline() {
    println!("\n=== Example 1: Basic Pipeline ===");

    let policy = RetryPolicy::constant(Duration::from_millis(10), 5);
    let mut hiccups = 2;

    let result = Outcome::run(|| Ok::<_, &str>(2))
        .try_map_retrying(
            |x| {
                if hiccups > 0 {
                    hiccups -= 1;
                    println!("  step failed, {} hiccups left", hiccups);
                    Err("service unavailable")
                } else {
                    Ok(x + 1)
                }
            },
            &policy,
        )
        .then_compose(|x| Outcome::success(x + 1));

    match result.get() {
        Ok(value) => println!("{}", value),
        Err(err) => println!("pipeline failed: {}", err),
    }
}

// ==================== Validating Retry ====================

/// Example 2: keep polling until the reading is acceptable.
fn example_validating_retry() {
    println!("\n=== Example 2: Validating Retry ===");

    let policy = RetryPolicy::linear(Duration::from_millis(5), 4);
    let mut readings = [4, 5, 6].into_iter();

    let reading = Outcome::run_validated(
        || readings.next().ok_or("sensor offline"),
        &policy,
        |r| *r > 4,
    );

    println!("accepted reading: {}", reading);
}

// ==================== Observability ====================

/// Example 3: log every failed attempt through a hook.
fn example_on_retry_hook() {
    println!("\n=== Example 3: Retry Hook ===");

    let policy = RetryPolicy::exponential(Duration::from_millis(5), 3).with_on_retry(
        |event: &RetryEvent<'_>| {
            println!(
                "  attempt {} failed after {:?}: {} (next wait: {:?})",
                event.attempt, event.elapsed, event.error, event.next_delay
            );
        },
    );

    let outcome = Outcome::run_retrying(|| Err::<(), _>("connection refused"), &policy);
    println!("result: {:?}", outcome);
}

// ==================== Recovery ====================

/// Example 4: fall back to a cached value once retries are exhausted.
fn example_recovery() {
    println!("\n=== Example 4: Recovery ===");

    let policy = RetryPolicy::constant(Duration::from_millis(1), 2);

    let price = Outcome::run_retrying(|| Err::<u32, _>("pricing service down"), &policy)
        .recover(|err| {
            println!("  using cached price: {}", err);
            42
        });

    println!("price: {}", price);
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    example_basic_pipeline();
    example_validating_retry();
    example_on_retry_hook();
    example_recovery();
}
