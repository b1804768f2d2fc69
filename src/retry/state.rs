use std::fmt;

use super::RetryPolicy;

/// Lifecycle of a single retried invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// No attempt made yet
    Idle,
    /// An attempt is running
    Attempting,
    /// An attempt failed and the controller is waiting out the delay
    Waiting,
    /// An attempt succeeded
    Succeeded,
    /// Every allowed attempt failed
    Exhausted,
    /// A wait was cancelled before the next attempt
    Cancelled,
}

impl RetryState {
    /// Returns `true` once no further attempts will be made.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RetryState::Succeeded | RetryState::Exhausted | RetryState::Cancelled
        )
    }
}

impl fmt::Display for RetryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryState::Idle => write!(f, "idle"),
            RetryState::Attempting => write!(f, "attempting"),
            RetryState::Waiting => write!(f, "waiting"),
            RetryState::Succeeded => write!(f, "succeeded"),
            RetryState::Exhausted => write!(f, "exhausted"),
            RetryState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-invocation attempt bookkeeping.
///
/// Created when an invocation starts and dropped when it resolves; the
/// controller itself holds no per-call state.
#[derive(Debug)]
pub(crate) struct AttemptState {
    max_attempts: u32,
    attempts_made: u32,
    state: RetryState,
}

impl AttemptState {
    pub(crate) fn new(policy: &RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts(),
            attempts_made: 0,
            state: RetryState::Idle,
        }
    }

    /// Number of failed attempts so far.
    pub(crate) fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// 1-based number of the attempt about to run or just finished.
    pub(crate) fn current_attempt(&self) -> u32 {
        match self.state {
            RetryState::Attempting | RetryState::Succeeded => self.attempts_made + 1,
            _ => self.attempts_made,
        }
    }

    pub(crate) fn state(&self) -> RetryState {
        self.state
    }

    pub(crate) fn begin_attempt(&mut self) {
        debug_assert!(matches!(self.state, RetryState::Idle | RetryState::Waiting));
        self.state = RetryState::Attempting;
    }

    pub(crate) fn succeed(&mut self) {
        self.state = RetryState::Succeeded;
    }

    /// Records a failed attempt and returns the state it leads to.
    pub(crate) fn fail(&mut self) -> RetryState {
        debug_assert_eq!(self.state, RetryState::Attempting);
        self.attempts_made += 1;
        self.state = if self.attempts_made < self.max_attempts {
            RetryState::Waiting
        } else {
            RetryState::Exhausted
        };
        self.state
    }

    pub(crate) fn cancel(&mut self) {
        self.state = RetryState::Cancelled;
    }
}
