//! Retry with a fixed inter-attempt delay.
//!
//! This module provides:
//! - `RetryPolicy`: validated attempt budget and delay
//! - `RetryController`: re-invokes its inner operation until success or exhaustion
//! - `Sleeper`: injectable, cancellable delay between attempts
//! - `RetryReporter`: side-channel observing each failed attempt
//!
//! # State machine
//!
//! ```text
//! Idle → Attempting → Succeeded
//!            │
//!            ├─(failure, budget left)──→ Waiting → Attempting
//!            ├─(failure, budget spent)─→ Exhausted
//!            └─(wait cancelled)────────→ Cancelled
//! ```
//!
//! Any failure triggers a retry, gate rejections included. Whether a gate's
//! rejection is retried therefore depends on where the gate sits relative to
//! the controller in the chain.

mod controller;
mod policy;
mod report;
mod sleeper;
mod state;

pub use controller::{RetryController, RetryLayer};
pub use policy::RetryPolicy;
pub use report::{AttemptRecord, AttemptReport, AttemptTrail, RetryReporter};
pub use sleeper::{
    BlockingSleeper, CancelToken, Cancelled, InstantSleeper, RecordingSleeper, Sleeper,
};
pub use state::RetryState;
