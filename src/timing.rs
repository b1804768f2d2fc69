use std::time::Instant;

use tower::Layer;

use crate::{error::Failure, invocable::Invocable};

/// Logs how long the inner call took.
///
/// Emits one `tracing` event per call (target `policy_chain::timing`) with
/// the elapsed time and outcome. Results and failures pass through unchanged.
#[derive(Debug, Clone)]
pub struct Timed<I> {
    inner: I,
}

impl<I> Timed<I> {
    /// Wraps `inner` with elapsed-time logging.
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    /// Returns the wrapped operation.
    pub fn get_ref(&self) -> &I {
        &self.inner
    }
}

impl<A, I: Invocable<A>> Invocable<A> for Timed<I> {
    type Output = I::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        let started = Instant::now();
        let result = self.inner.invoke(args);
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) => tracing::info!(
                target: "policy_chain::timing",
                operation = self.inner.name(),
                elapsed_us,
                outcome = "success",
                "call completed"
            ),
            Err(failure) => tracing::info!(
                target: "policy_chain::timing",
                operation = self.inner.name(),
                elapsed_us,
                outcome = %failure.kind(),
                "call completed"
            ),
        }
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Layer producing a [`Timed`] wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimedLayer;

impl<I> Layer<I> for TimedLayer {
    type Service = Timed<I>;

    fn layer(&self, inner: I) -> Self::Service {
        Timed::new(inner)
    }
}
