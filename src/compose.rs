//! Static composition of layers around a base operation.
//!
//! Layers are declared outermost first. Building applies them around the
//! operation once; the result is reused for every call and holds no per-call
//! state.
//!
//! ```text
//! Composer::new()
//!     .authenticate()          // 1st: runs first, rejects before anything else
//!     .authorize("admin")      // 2nd
//!     .retry(policy)           // 3rd: retries only what lies beneath it
//!     .build(operation);       // innermost
//! ```
//!
//! Placement decides which failures a retry sees. A gate declared before
//! `retry` rejects once and is never retried; a gate declared after `retry`
//! sits inside it, so its rejection is retried like any other failure.
//! Transforms follow the same rule. A fallible transform declared before
//! `retry` fails once and is returned as-is; one declared after `retry` sits
//! inside it, so its failure is retried and the base operation runs again on
//! every attempt.

use std::fmt;

use tower::{
    layer::util::{Identity as NoLayer, Stack},
    Layer, ServiceBuilder,
};

use crate::{
    error::Failure,
    invocable::Invocable,
    policy::{Authenticated, Authorized},
    retry::{RetryLayer, RetryPolicy},
    timing::TimedLayer,
    transform::{MapLayer, TryMapLayer},
};

/// Ordered, immutable description of a layer chain.
///
/// Each method returns a new composer with one more layer appended on the
/// inside. [`build`](Self::build) borrows the composer, so one chain can
/// produce any number of identical composed operations.
///
/// # Examples
///
/// ```
/// use policy_chain::{Composer, Identity, Operation};
///
/// let dashboard = Operation::new("view_admin_dashboard", |_: Identity| {
///     Ok::<_, &str>("Admin Dashboard Access Granted")
/// });
///
/// let guarded = Composer::new()
///     .authenticate()
///     .authorize("admin")
///     .build(dashboard);
///
/// assert!(guarded.call(Identity::authenticated("admin")).is_ok());
/// assert!(guarded.call(Identity::authenticated("user")).is_err());
/// ```
#[derive(Clone)]
pub struct Composer<L> {
    builder: ServiceBuilder<L>,
}

impl Composer<NoLayer> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            builder: ServiceBuilder::new(),
        }
    }
}

impl Default for Composer<NoLayer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: fmt::Debug> fmt::Debug for Composer<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("layers", &self.builder)
            .finish()
    }
}

impl<L> Composer<L> {
    /// Appends an arbitrary layer.
    pub fn layer<T>(self, layer: T) -> Composer<Stack<T, L>> {
        Composer {
            builder: self.builder.layer(layer),
        }
    }

    /// Appends an authentication gate.
    pub fn authenticate(self) -> Composer<Stack<Authenticated, L>> {
        self.layer(Authenticated)
    }

    /// Appends an authorization gate for `role`.
    pub fn authorize(self, role: impl Into<String>) -> Composer<Stack<Authorized, L>> {
        self.layer(Authorized::for_role(role))
    }

    /// Appends an infallible result transform.
    pub fn map<F>(self, f: F) -> Composer<Stack<MapLayer<F>, L>> {
        self.layer(MapLayer::new(f))
    }

    /// Appends a fallible result transform.
    pub fn try_map<F>(self, f: F) -> Composer<Stack<TryMapLayer<F>, L>> {
        self.layer(TryMapLayer::new(f))
    }

    /// Appends a retry controller using a blocking sleeper.
    pub fn retry(self, policy: RetryPolicy) -> Composer<Stack<RetryLayer, L>> {
        self.layer(RetryLayer::new(policy))
    }

    /// Appends a preconfigured retry layer.
    pub fn retry_with(self, layer: RetryLayer) -> Composer<Stack<RetryLayer, L>> {
        self.layer(layer)
    }

    /// Appends elapsed-time logging.
    pub fn timed(self) -> Composer<Stack<TimedLayer, L>> {
        self.layer(TimedLayer)
    }

    /// Wraps `operation` in every declared layer.
    ///
    /// Pass `&operation` to keep ownership of the operation with the caller.
    pub fn build<S>(&self, operation: S) -> Composed<L::Service>
    where
        L: Layer<S>,
    {
        Composed {
            inner: self.builder.service(operation),
        }
    }
}

/// An operation wrapped in its full layer chain.
#[derive(Debug, Clone)]
pub struct Composed<S> {
    inner: S,
}

impl<S> Composed<S> {
    /// Invokes the chain with `args`.
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] produced by whichever layer rejected or failed
    /// the call.
    pub fn call<A>(&self, args: A) -> Result<S::Output, Failure>
    where
        S: Invocable<A>,
    {
        let span = tracing::debug_span!("invoke", operation = self.inner.name());
        let _enter = span.enter();
        self.inner.invoke(args)
    }

    /// Returns the outermost layer.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consumes the composition, returning the outermost layer.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<A, S: Invocable<A>> Invocable<A> for Composed<S> {
    type Output = S::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        self.call(args)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{error::FailureKind, identity::Identity, invocable::Operation};

    #[test]
    fn first_declared_layer_runs_outermost() {
        let op = Operation::new("five", |_: Identity| Ok::<_, Failure>(5));
        let composed = Composer::new()
            .map(|n: i32| n + 1)
            .map(|n: i32| n * 10)
            .build(op);

        // (5 * 10) + 1: the inner map runs first on the way out.
        assert_eq!(composed.call(Identity::anonymous()).unwrap(), 51);
    }

    #[test]
    fn outer_gate_short_circuits_inner_gate() {
        let op = Operation::new("admin", |_: Identity| Ok::<_, Failure>(()));
        let composed = Composer::new().authenticate().authorize("admin").build(op);

        let failure = composed.call(Identity::anonymous()).unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Unauthenticated);
    }

    #[test]
    fn build_borrows_caller_owned_operation() {
        let calls = Cell::new(0);
        let op = Operation::new("counted", |n: u32| {
            calls.set(calls.get() + 1);
            Ok::<_, Failure>(n)
        });
        let chain = Composer::new().map(|n: u32| n * 2);

        let a = chain.build(&op);
        let b = chain.build(&op);

        assert_eq!(a.call(2).unwrap(), b.call(2).unwrap());
        assert_eq!(calls.get(), 2);
        assert_eq!(Invocable::<u32>::name(&a), "counted");
    }

    #[test]
    fn empty_chain_is_the_operation() {
        let op = Operation::new("identity", |n: u8| Ok::<_, Failure>(n));
        let composed = Composer::default().build(op);

        assert_eq!(composed.call(3).unwrap(), 3);
        assert_eq!(Invocable::<u8>::name(composed.get_ref()), "identity");
        assert_eq!(composed.into_inner().invoke(4u8).unwrap(), 4);
    }
}
