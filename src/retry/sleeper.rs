//! Abstraction for waiting between attempts.
//!
//! Enables fast, deterministic tests without real time delays, and lets a
//! blocked retry loop be interrupted from another thread.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// The wait between two attempts was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepInterrupted;

impl std::fmt::Display for SleepInterrupted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sleep interrupted")
    }
}

impl std::error::Error for SleepInterrupted {}

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Wait for `duration`, or fail if the wait is interrupted.
    fn sleep(&self, duration: Duration) -> Result<(), SleepInterrupted>;
}

/// Production sleeper using `std::thread::sleep`. Never interrupted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), SleepInterrupted> {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
        Ok(())
    }
}

/// Sleeper that can be woken and cancelled from another thread.
///
/// Clones share state: keep one clone in the policy and hand another to
/// whoever decides to cancel. Once [`interrupt`](Self::interrupt) is called
/// the current wait and every later one fail until [`reset`](Self::reset).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use trywise::retry::{InterruptibleSleeper, Sleeper};
///
/// let sleeper = InterruptibleSleeper::new();
/// let handle = sleeper.clone();
///
/// let waiter = std::thread::spawn(move || sleeper.sleep(Duration::from_secs(60)));
/// handle.interrupt();
///
/// assert!(waiter.join().unwrap().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterruptibleSleeper {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl InterruptibleSleeper {
    /// Create a sleeper that has not been interrupted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interrupt the current wait, if any, and all future waits.
    pub fn interrupt(&self) {
        let (flag, condvar) = &*self.state;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    /// Returns `true` once interrupted.
    pub fn is_interrupted(&self) -> bool {
        *self.state.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear a previous interruption.
    pub fn reset(&self) {
        *self.state.0.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

impl Sleeper for InterruptibleSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), SleepInterrupted> {
        let (flag, condvar) = &*self.state;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, duration, |interrupted| !*interrupted)
            .unwrap_or_else(PoisonError::into_inner);
        if *guard {
            Err(SleepInterrupted)
        } else {
            Ok(())
        }
    }
}

/// Test sleeper that doesn't actually sleep
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> Result<(), SleepInterrupted> {
        Ok(())
    }
}

/// Test sleeper that tracks all sleep calls without sleeping
#[derive(Debug, Clone, Default)]
pub struct TrackingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingSleeper {
    /// Create a sleeper with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested duration, in order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the recorded calls.
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), SleepInterrupted> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        Ok(())
    }
}
