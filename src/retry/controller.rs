use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tower::Layer;

use super::{
    report::{AttemptReport, RetryReporter},
    sleeper::{BlockingSleeper, Sleeper},
    state::{AttemptState, RetryState},
    RetryPolicy,
};
use crate::{error::Failure, invocable::Invocable};

/// Re-invokes its inner operation until it succeeds or the budget is spent.
///
/// Arguments are cloned for every attempt. Each failed attempt is logged
/// (target `policy_chain::retry`) and handed to the optional reporter before
/// the controller waits out the policy delay. Once `max_attempts` calls have
/// failed, the invocation ends with [`Failure::RetriesExhausted`] carrying
/// the last failure. No delay follows the final attempt.
///
/// The controller keeps no per-call state, so one instance may serve
/// concurrent invocations.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
/// use policy_chain::retry::{InstantSleeper, RetryController, RetryPolicy};
/// use policy_chain::{Invocable, Operation};
/// use std::time::Duration;
///
/// let calls = AtomicU32::new(0);
/// let op = Operation::new("flaky", |_: ()| {
///     if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///         Err("transient")
///     } else {
///         Ok("done")
///     }
/// });
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1)).unwrap();
/// let retry = RetryController::new(op, policy).with_sleeper(Arc::new(InstantSleeper));
///
/// assert_eq!(retry.invoke(()).unwrap(), "done");
/// ```
#[derive(Clone)]
pub struct RetryController<I> {
    inner: I,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    reporter: Option<Arc<dyn RetryReporter>>,
}

impl<I> RetryController<I> {
    /// Wraps `inner` with the given policy and a [`BlockingSleeper`].
    pub fn new(inner: I, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleeper: Arc::new(BlockingSleeper::new()),
            reporter: None,
        }
    }

    /// Replaces the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Sets a reporter observing each failed attempt.
    pub fn with_reporter(mut self, reporter: Arc<dyn RetryReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Returns the policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the wrapped operation.
    pub fn get_ref(&self) -> &I {
        &self.inner
    }
}

impl<I: fmt::Debug> fmt::Debug for RetryController<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryController")
            .field("inner", &self.inner)
            .field("policy", &self.policy)
            .field("has_reporter", &self.reporter.is_some())
            .finish_non_exhaustive()
    }
}

impl<A, I> Invocable<A> for RetryController<I>
where
    A: Clone,
    I: Invocable<A>,
{
    type Output = I::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        let mut attempts = AttemptState::new(&self.policy);

        loop {
            attempts.begin_attempt();
            let cause = match self.inner.invoke(args.clone()) {
                Ok(value) => {
                    attempts.succeed();
                    if attempts.attempts_made() > 0 {
                        tracing::info!(
                            target: "policy_chain::retry",
                            operation = self.inner.name(),
                            attempt = attempts.current_attempt(),
                            "succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(cause) => cause,
            };

            let next = attempts.fail();
            let delay = match next {
                RetryState::Waiting => self.policy.delay(),
                _ => Duration::ZERO,
            };
            self.report(self.inner.name(), &attempts, &cause, next, delay);

            if attempts.state() == RetryState::Exhausted {
                tracing::error!(
                    target: "policy_chain::retry",
                    operation = self.inner.name(),
                    attempts = attempts.attempts_made(),
                    "retries exhausted"
                );
                return Err(Failure::RetriesExhausted {
                    attempts: attempts.attempts_made(),
                    last_cause: Box::new(cause),
                });
            }

            if self.sleeper.sleep(delay).is_err() {
                attempts.cancel();
                tracing::warn!(
                    target: "policy_chain::retry",
                    operation = self.inner.name(),
                    attempts_made = attempts.attempts_made(),
                    "retry cancelled"
                );
                return Err(Failure::Cancelled {
                    attempts_made: attempts.attempts_made(),
                });
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<I> RetryController<I> {
    fn report(
        &self,
        operation: &str,
        attempts: &AttemptState,
        cause: &Failure,
        next: RetryState,
        delay: Duration,
    ) {
        tracing::warn!(
            target: "policy_chain::retry",
            operation,
            attempt = attempts.current_attempt(),
            max_attempts = self.policy.max_attempts(),
            cause = %cause,
            next = %next,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "attempt failed"
        );

        if let Some(reporter) = &self.reporter {
            reporter.failed_attempt(&AttemptReport {
                operation,
                attempt: attempts.current_attempt(),
                max_attempts: self.policy.max_attempts(),
                cause,
                next,
                delay,
            });
        }
    }
}

/// Layer producing a [`RetryController`].
///
/// The sleeper and reporter are shared by every controller the layer builds.
#[derive(Clone)]
pub struct RetryLayer {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    reporter: Option<Arc<dyn RetryReporter>>,
}

impl RetryLayer {
    /// Creates a layer with the given policy and a [`BlockingSleeper`].
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(BlockingSleeper::new()),
            reporter: None,
        }
    }

    /// Replaces the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Sets a reporter observing each failed attempt.
    pub fn with_reporter(mut self, reporter: Arc<dyn RetryReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }
}

impl fmt::Debug for RetryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryLayer")
            .field("policy", &self.policy)
            .field("has_reporter", &self.reporter.is_some())
            .finish_non_exhaustive()
    }
}

impl<I> Layer<I> for RetryLayer {
    type Service = RetryController<I>;

    fn layer(&self, inner: I) -> Self::Service {
        RetryController {
            inner,
            policy: self.policy,
            sleeper: Arc::clone(&self.sleeper),
            reporter: self.reporter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::{
        error::FailureKind,
        invocable::Operation,
        retry::{AttemptTrail, CancelToken, InstantSleeper, RecordingSleeper},
    };

    fn policy(max_attempts: u32, delay_ms: u64) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(delay_ms)).unwrap()
    }

    #[test]
    fn first_success_takes_no_delay() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let op = Operation::new("steady", |n: u8| Ok::<_, Failure>(n));
        let retry = RetryController::new(op, policy(3, 10)).with_sleeper(sleeper.clone());

        assert_eq!(retry.invoke(1).unwrap(), 1);
        assert!(sleeper.delays().is_empty());
        assert_eq!(retry.policy().max_attempts(), 3);
        assert_eq!(retry.policy().delay(), Duration::from_millis(10));
        assert_eq!(Invocable::<u8>::name(retry.get_ref()), "steady");
    }

    #[test]
    fn recovers_after_two_failures() {
        let calls = AtomicU32::new(0);
        let sleeper = Arc::new(RecordingSleeper::new());
        let trail = Arc::new(AttemptTrail::new());
        let op = Operation::new("flaky", |_: ()| {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err("transient")
            } else {
                Ok(42)
            }
        });
        let retry = RetryController::new(&op, policy(3, 25))
            .with_sleeper(sleeper.clone())
            .with_reporter(trail.clone());

        assert_eq!(retry.invoke(()).unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(trail.len(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(25); 2]);
    }

    #[test]
    fn exhaustion_carries_last_cause() {
        let calls = AtomicU32::new(0);
        let op = Operation::new("down", |_: ()| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err::<(), _>(format!("failure #{}", n))
        });
        let sleeper = Arc::new(RecordingSleeper::new());
        let retry = RetryController::new(&op, policy(3, 5)).with_sleeper(sleeper.clone());

        match retry.invoke(()) {
            Err(Failure::RetriesExhausted {
                attempts,
                last_cause,
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last_cause.to_string(), "operation failed: failure #3");
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[test]
    fn single_attempt_policy_never_retries() {
        let calls = AtomicU32::new(0);
        let op = Operation::new("once", |_: ()| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("nope")
        });
        let retry = RetryController::new(&op, RetryPolicy::no_retry())
            .with_sleeper(Arc::new(InstantSleeper));

        let failure = retry.invoke(()).unwrap_err();
        assert_eq!(failure.kind(), FailureKind::RetriesExhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_wait_stops_retrying() {
        let token = CancelToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);
        let op = Operation::new("stubborn", |_: ()| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("nope")
        });
        let retry = RetryController::new(&op, policy(5, 1_000))
            .with_sleeper(Arc::new(BlockingSleeper::with_token(token)));

        match retry.invoke(()) {
            Err(Failure::Cancelled { attempts_made }) => assert_eq!(attempts_made, 1),
            other => panic!("expected Cancelled, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_attempt_sees_same_arguments() {
        let seen = std::sync::Mutex::new(Vec::new());
        let op = Operation::new("record_args", |args: (String, u8)| {
            seen.lock().unwrap().push(args);
            Err::<(), _>("again")
        });
        let retry = RetryLayer::new(policy(3, 0))
            .with_sleeper(Arc::new(InstantSleeper))
            .layer(&op);

        let _ = retry.invoke(("payload".to_string(), 7));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|a| a == &("payload".to_string(), 7)));
    }

    #[test]
    fn unbounded_delay_is_cancellable() {
        let token = CancelToken::new();
        let op = Operation::new("stubborn", |_: ()| Err::<(), _>("nope"));
        let policy = RetryPolicy::new(2, Duration::MAX).unwrap();
        let retry = RetryController::new(op, policy)
            .with_sleeper(Arc::new(BlockingSleeper::with_token(token.clone())));

        let caller = std::thread::spawn(move || retry.invoke(()));
        BlockingSleeper::new()
            .sleep(Duration::from_millis(50))
            .unwrap();
        token.cancel();

        match caller.join().unwrap() {
            Err(Failure::Cancelled { attempts_made }) => assert_eq!(attempts_made, 1),
            other => panic!("expected Cancelled, got {:?}", other),
        }
    }
}
