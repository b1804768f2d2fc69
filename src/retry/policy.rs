use std::time::Duration;

use crate::error::ConfigError;

/// Attempt budget and fixed delay for a [`RetryController`].
///
/// `max_attempts` counts every call, the first included; a policy with
/// `max_attempts == 1` never retries.
///
/// [`RetryController`]: super::RetryController
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use policy_chain::retry::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1)).unwrap();
/// assert_eq!(policy.max_attempts(), 3);
///
/// assert!(RetryPolicy::new(0, Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` calls separated by `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroAttempts`] if `max_attempts` is zero.
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    /// A policy that makes a single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Returns the maximum number of calls per invocation.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay between consecutive attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}
