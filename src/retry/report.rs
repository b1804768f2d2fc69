use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::RetryState;
use crate::error::{Failure, FailureKind};

/// Details of one failed attempt, handed to a [`RetryReporter`].
#[derive(Debug)]
pub struct AttemptReport<'a> {
    /// Name of the retried operation
    pub operation: &'a str,
    /// 1-based number of the failed attempt
    pub attempt: u32,
    /// Attempt budget of the policy
    pub max_attempts: u32,
    /// Why the attempt failed
    pub cause: &'a Failure,
    /// `Waiting` if another attempt follows, `Exhausted` otherwise
    pub next: RetryState,
    /// Delay before the next attempt, zero when exhausted
    pub delay: Duration,
}

/// Observes failed attempts of a [`RetryController`].
///
/// Called once per failed attempt, before any delay.
///
/// [`RetryController`]: super::RetryController
pub trait RetryReporter: Send + Sync {
    /// Observes a failed attempt.
    fn failed_attempt(&self, report: &AttemptReport<'_>);
}

/// Owned summary of a failed attempt, as stored by [`AttemptTrail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Name of the retried operation
    pub operation: String,
    /// 1-based number of the failed attempt
    pub attempt: u32,
    /// Attempt budget of the policy
    pub max_attempts: u32,
    /// Kind of the failure
    pub kind: FailureKind,
    /// Rendered failure message
    pub cause: String,
    /// State the controller moved to after the failure
    pub next: RetryState,
}

impl From<&AttemptReport<'_>> for AttemptRecord {
    fn from(report: &AttemptReport<'_>) -> Self {
        Self {
            operation: report.operation.to_string(),
            attempt: report.attempt,
            max_attempts: report.max_attempts,
            kind: report.cause.kind(),
            cause: report.cause.to_string(),
            next: report.next,
        }
    }
}

/// In-memory recorder of failed attempts.
///
/// Records are kept in the order they were reported. Share it with a
/// controller through an `Arc`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use policy_chain::retry::{AttemptTrail, InstantSleeper, RetryController, RetryPolicy};
/// use policy_chain::{Invocable, Operation};
///
/// let trail = Arc::new(AttemptTrail::new());
/// let op = Operation::new("flaky", |_: ()| Err::<(), _>("down"));
/// let retry = RetryController::new(op, RetryPolicy::no_retry())
///     .with_sleeper(Arc::new(InstantSleeper))
///     .with_reporter(trail.clone());
///
/// assert!(retry.invoke(()).is_err());
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AttemptTrail {
    records: Mutex<Vec<AttemptRecord>>,
}

impl AttemptTrail {
    /// Creates a new empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn record(&self, record: AttemptRecord) {
        self.lock().push(record);
    }

    /// Returns a snapshot of all records.
    pub fn records(&self) -> Vec<AttemptRecord> {
        self.lock().clone()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears all records.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AttemptRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RetryReporter for AttemptTrail {
    fn failed_attempt(&self, report: &AttemptReport<'_>) {
        self.record(AttemptRecord::from(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report<'a>(cause: &'a Failure, attempt: u32, next: RetryState) -> AttemptReport<'a> {
        AttemptReport {
            operation: "fetch",
            attempt,
            max_attempts: 2,
            cause,
            next,
            delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn trail_starts_empty() {
        let trail = AttemptTrail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
    }

    #[test]
    fn trail_keeps_report_order() {
        let trail = AttemptTrail::new();
        let first = Failure::operation("timeout");
        let second = Failure::Unauthenticated;

        trail.failed_attempt(&report(&first, 1, RetryState::Waiting));
        trail.failed_attempt(&report(&second, 2, RetryState::Exhausted));

        let records = trail.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].attempt, 1);
        assert_eq!(records[0].cause, "operation failed: timeout");
        assert_eq!(records[1].kind, FailureKind::Unauthenticated);
        assert_eq!(records[1].next, RetryState::Exhausted);
    }

    #[test]
    fn trail_clear() {
        let trail = AttemptTrail::new();
        let cause = Failure::operation("x");
        trail.failed_attempt(&report(&cause, 1, RetryState::Waiting));

        trail.clear();
        assert!(trail.is_empty());
    }
}
