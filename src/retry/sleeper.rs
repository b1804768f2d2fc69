use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

/// A delay was interrupted by its [`CancelToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("delay cancelled")]
pub struct Cancelled;

/// Suspends the calling invocation between retry attempts.
///
/// Injected into a [`RetryController`] so tests can run without real waits
/// and callers can cancel a pending retry.
///
/// [`RetryController`]: super::RetryController
pub trait Sleeper: Send + Sync {
    /// Waits for `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the wait was cancelled before or while it ran.
    fn sleep(&self, delay: Duration) -> Result<(), Cancelled>;
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// Shared flag that interrupts every [`BlockingSleeper`] watching it.
///
/// Cloning yields a handle to the same flag. Cancellation is permanent.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use policy_chain::retry::{BlockingSleeper, CancelToken, Sleeper};
///
/// let token = CancelToken::new();
/// let sleeper = BlockingSleeper::with_token(token.clone());
///
/// token.cancel();
/// assert!(sleeper.sleep(Duration::from_secs(60)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every pending wait.
    pub fn cancel(&self) {
        let mut cancelled = self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.state.wakeup.notify_all();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Blocks the calling thread for the full delay unless cancelled.
///
/// This is the default sleeper for a [`RetryController`].
///
/// [`RetryController`]: super::RetryController
#[derive(Debug, Clone, Default)]
pub struct BlockingSleeper {
    token: CancelToken,
}

impl BlockingSleeper {
    /// Creates a sleeper with its own, never-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sleeper interrupted by `token`.
    pub fn with_token(token: CancelToken) -> Self {
        Self { token }
    }

    /// Returns the token this sleeper watches.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Sleeper for BlockingSleeper {
    fn sleep(&self, delay: Duration) -> Result<(), Cancelled> {
        let state = &self.token.state;
        let mut cancelled = state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(deadline) = Instant::now().checked_add(delay) else {
            // Unrepresentable deadline: only cancellation ends the wait.
            let _guard = state
                .wakeup
                .wait_while(cancelled, |cancelled| !*cancelled)
                .unwrap_or_else(PoisonError::into_inner);
            return Err(Cancelled);
        };

        loop {
            if *cancelled {
                return Err(Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            // Spurious wakeups loop back to re-check the flag and deadline.
            let (guard, _) = state
                .wakeup
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            cancelled = guard;
        }
    }
}

/// Returns immediately without waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _delay: Duration) -> Result<(), Cancelled> {
        Ok(())
    }
}

/// Records every requested delay without waiting.
///
/// Useful for asserting how many delays a retried invocation took and for
/// how long.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Creates a sleeper with no recorded delays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded delays, oldest first.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the sum of all recorded delays.
    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> Result<(), Cancelled> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn blocking_sleeper_waits_out_delay() {
        let sleeper = BlockingSleeper::new();
        let started = Instant::now();

        assert_eq!(sleeper.sleep(Duration::from_millis(20)), Ok(()));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn zero_delay_returns_immediately() {
        assert_eq!(BlockingSleeper::new().sleep(Duration::ZERO), Ok(()));
    }

    #[test]
    fn cancel_interrupts_pending_wait() {
        let token = CancelToken::new();
        let sleeper = BlockingSleeper::with_token(token.clone());

        let canceller = thread::spawn(move || {
            BlockingSleeper::new()
                .sleep(Duration::from_millis(20))
                .unwrap();
            token.cancel();
        });

        let started = Instant::now();
        assert_eq!(sleeper.sleep(Duration::from_secs(30)), Err(Cancelled));
        assert!(started.elapsed() < Duration::from_secs(30));
        canceller.join().unwrap();
        assert!(sleeper.token().is_cancelled());
    }

    #[test]
    fn unbounded_delay_waits_for_cancel() {
        let token = CancelToken::new();
        let sleeper = BlockingSleeper::with_token(token.clone());

        let canceller = thread::spawn(move || {
            BlockingSleeper::new()
                .sleep(Duration::from_millis(20))
                .unwrap();
            token.cancel();
        });

        assert_eq!(sleeper.sleep(Duration::MAX), Err(Cancelled));
        canceller.join().unwrap();
    }

    #[test]
    fn recording_sleeper_tracks_delays() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_millis(10)).unwrap();
        sleeper.sleep(Duration::from_millis(15)).unwrap();

        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(10), Duration::from_millis(15)]
        );
        assert_eq!(sleeper.total(), Duration::from_millis(25));
    }
}
