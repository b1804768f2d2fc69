//! Composable policy layers around plain callable operations.
//!
//! This crate attaches cross-cutting behavior to an operation without
//! touching the operation itself:
//! - **Gates**: reject callers that are not authenticated or lack a role
//! - **Transforms**: post-process successful results
//! - **Retry**: re-invoke failing operations with a fixed, cancellable delay
//! - **Timing**: log how long each call took
//!
//! # Core Types
//!
//! - [`Invocable`]: The call abstraction every operation and layer implements
//! - [`Operation`]: A named base operation built from a closure
//! - [`Identity`]: Caller identity read by the gates
//! - [`Composer`]: Builder declaring the layer chain, outermost first
//! - [`Failure`]: Typed failure surfaced to the caller
//!
//! # Examples
//!
//! ```
//! use std::{sync::Arc, time::Duration};
//! use policy_chain::retry::{InstantSleeper, RetryLayer, RetryPolicy};
//! use policy_chain::{Composer, Failure, Identity, Operation};
//!
//! let add = Operation::new("add", |(_, a, b): (&Identity, i64, i64)| Ok::<_, Failure>(a + b));
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(1)).expect("valid policy");
//! let chain = Composer::new()
//!     .authenticate()
//!     .map(|n: i64| n * n)
//!     .retry_with(RetryLayer::new(policy).with_sleeper(Arc::new(InstantSleeper)));
//!
//! let squared_add = chain.build(&add);
//!
//! let user = Identity::authenticated("user");
//! assert_eq!(squared_add.call((&user, 2, 3)).unwrap(), 25);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compose;
mod error;
mod gate;
mod identity;
mod invocable;
mod policy;
pub mod retry;
mod timing;
mod transform;

pub use compose::{Composed, Composer};
pub use error::{BoxError, ConfigError, Failure, FailureKind};
pub use gate::{AuthenticationGate, AuthorizationGate};
pub use identity::{Identified, Identity};
pub use invocable::{Invocable, Operation};
pub use policy::{Authenticated, Authorized};
pub use timing::{Timed, TimedLayer};
pub use transform::{MapLayer, Transform, TryMapLayer, TryTransform};
