//! End-to-end pipelines mixing plain and retried steps.
//!
//! This test suite walks an order-processing flow where some steps talk to
//! flaky dependencies and need a retry policy.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::time::Duration;

use trywise::prelude::*;
use trywise::retry::{InstantSleeper, TrackingSleeper};
use trywise::testing::Script;
use trywise::{assert_failure, assert_failure_matches, assert_success};

// Example domain types for testing
#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: u32,
    quantity: u32,
}

#[derive(Debug, PartialEq)]
struct OutOfStock {
    requested: u32,
    available: u32,
}

impl fmt::Display for OutOfStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "requested {}, only {} left", self.requested, self.available)
    }
}

impl std::error::Error for OutOfStock {}

fn parse_order(raw: &str) -> Result<Order, String> {
    let (id, quantity) = raw
        .split_once(':')
        .ok_or_else(|| format!("malformed order '{}'", raw))?;
    Ok(Order {
        id: id.trim().parse().map_err(|e| format!("bad id: {}", e))?,
        quantity: quantity.trim().parse().map_err(|e| format!("bad quantity: {}", e))?,
    })
}

fn reserve(order: &Order, available: u32) -> Result<u32, OutOfStock> {
    if order.quantity <= available {
        Ok(available - order.quantity)
    } else {
        Err(OutOfStock {
            requested: order.quantity,
            available,
        })
    }
}

fn quick(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::constant(Duration::from_millis(10), max_attempts).with_sleeper(InstantSleeper)
}

#[test]
fn test_entry_point_pipeline_yields_four() {
    let policy = RetryPolicy::constant(Duration::from_millis(10), 5);

    let result = Outcome::run(|| Ok::<_, &str>(2))
        .try_map_retrying(|x| Ok::<_, &str>(x + 1), &policy)
        .then_compose(|x| Outcome::success(x + 1));

    assert_eq!(result.get(), Ok(4));
}

#[test]
fn test_order_flow_with_flaky_inventory() {
    let inventory = Script::failing_then(2, 10u32);
    let shipped = RefCell::new(Vec::new());

    let outcome = Outcome::run(|| parse_order("7: 3"))
        .then_compose_retrying(
            |order| {
                Outcome::run(|| inventory.call())
                    .try_map(|available| reserve(&order, available))
                    .map(|left| (order, left))
            },
            &quick(5),
        )
        .then_accept(|(order, left)| {
            shipped.borrow_mut().push((order.id, left));
            Ok::<_, &str>(())
        });

    assert_success!(outcome, ());
    assert_eq!(inventory.calls(), 3);
    assert_eq!(*shipped.borrow(), vec![(7, 7)]);
}

#[test]
fn test_caller_error_type_survives_the_pipeline() {
    let outcome = Outcome::run(|| parse_order("1:50")).try_map(|order| reserve(&order, 5));

    let err = assert_failure!(outcome);
    assert_eq!(
        err.downcast_ref::<OutOfStock>(),
        Some(&OutOfStock {
            requested: 50,
            available: 5
        })
    );
}

#[test]
fn test_exhausted_step_keeps_last_error_after_get() {
    let script = Script::<u32>::failing_then(10, 0);
    let outcome = Outcome::success(Order { id: 1, quantity: 1 })
        .try_map_retrying(|_| script.call(), &quick(3));

    let err = outcome.get().unwrap_err();
    assert!(err.is_empty_result());
    match err.cause() {
        Some(Error::RetryExhausted(exhausted)) => {
            assert_eq!(exhausted.attempts, 3);
            assert_eq!(exhausted.error().to_string(), "attempt 3 failed");
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[test]
fn test_failure_short_circuits_retried_steps() {
    let sleeper = TrackingSleeper::new();
    let policy = quick(4).with_sleeper(sleeper.clone());
    let downstream = Cell::new(0);
    let bump = || downstream.set(downstream.get() + 1);

    let outcome = Outcome::run(|| parse_order("not an order"))
        .try_map_retrying(
            |order| {
                bump();
                reserve(&order, 100)
            },
            &policy,
        )
        .then_run_retrying(
            || {
                bump();
                Ok::<_, &str>(())
            },
            &policy,
        );

    assert_failure_matches!(outcome, Error::Operation(e) if e.to_string() == "malformed order 'not an order'");
    assert_eq!(downstream.get(), 0);
    assert!(sleeper.calls().is_empty());
}

#[test]
fn test_recover_after_exhaustion() {
    let outcome = Outcome::run_retrying(|| Err::<u32, _>("inventory offline"), &quick(2))
        .recover(|err| {
            assert!(err.is_retry_exhausted());
            0
        });

    assert_success!(outcome, 0);
}

#[test]
fn test_combine_reports_first_failure() {
    let left = Outcome::run(|| parse_order("x"));
    let right = Outcome::run(|| parse_order("y"));

    let both = Outcome::combine(left.clone(), right, |a: Order, b: Order| a.quantity + b.quantity);

    assert_eq!(both.into_error(), left.into_error());
}

#[test]
fn test_validated_step_in_pipeline() {
    let readings = Script::new(vec![Ok(4), Ok(5), Ok(6)]);

    let outcome = Outcome::run_validated(|| readings.call(), &quick(3), |r| *r > 4)
        .map(|r| r * 10);

    assert_success!(outcome, 50);
    assert_eq!(readings.calls(), 2);
}

#[test]
fn test_lifted_retried_function_reused_across_orders() {
    let lookups = Cell::new(0);
    let mut price_of = Outcome::lift_retrying(
        |id: u32| {
            lookups.set(lookups.get() + 1);
            if lookups.get() % 2 == 1 {
                Err("price service busy")
            } else {
                Ok(id * 3)
            }
        },
        &quick(2),
    );

    let total = Outcome::combine(price_of(1), price_of(2), |a, b| a + b);

    assert_success!(total, 9);
}

#[test]
fn test_config_driven_policy() {
    let config = trywise::retry::RetryConfig {
        max_attempts: 3,
        backoff: trywise::retry::BackoffConfig::Linear { base_ms: 5 },
        ..Default::default()
    };
    let sleeper = TrackingSleeper::new();
    let policy = RetryPolicy::from(config).with_sleeper(sleeper.clone());
    let script = Script::<()>::failing_then(5, ());

    let outcome = Outcome::run_retrying(|| script.call(), &policy);

    assert!(outcome.is_failure());
    assert_eq!(
        sleeper.calls(),
        vec![Duration::from_millis(5), Duration::from_millis(10)]
    );
}

#[test]
fn test_plain_pipeline_yields_four() {
    let result = Outcome::run(|| Ok::<_, &str>(2))
        .map(|x| x + 1)
        .then_compose(|x| Outcome::success(x + 1));

    assert_eq!(result.get(), Ok(4));
}
