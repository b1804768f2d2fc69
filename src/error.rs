use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed error produced by a base operation.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A failure surfaced by a composed operation.
///
/// Every layer in a chain reports failures through this type. Gate rejections
/// and retry exhaustion are distinct variants so callers can branch on them
/// without inspecting messages.
#[derive(Debug, Error)]
pub enum Failure {
    /// The identity is not authenticated
    #[error("Unauthenticated")]
    Unauthenticated,
    /// The identity does not carry the role a gate requires
    #[error("Unauthorized for role '{required_role}'")]
    Unauthorized {
        /// Role the gate was composed with
        required_role: String,
    },
    /// The base operation (or an inner transform) failed
    #[error("operation failed: {cause}")]
    OperationFailure {
        /// The underlying error
        #[source]
        cause: BoxError,
    },
    /// Every allowed attempt failed
    #[error("retries exhausted after {attempts} attempts: {last_cause}")]
    RetriesExhausted {
        /// Number of attempts made, always the policy's `max_attempts`
        attempts: u32,
        /// Failure returned by the final attempt
        #[source]
        last_cause: Box<Failure>,
    },
    /// An inter-attempt delay was cancelled
    #[error("cancelled after {attempts_made} failed attempts")]
    Cancelled {
        /// Failed attempts observed before the cancellation
        attempts_made: u32,
    },
}

impl Failure {
    /// Wraps any error as an [`Failure::OperationFailure`].
    pub fn operation(cause: impl Into<BoxError>) -> Self {
        Failure::OperationFailure {
            cause: cause.into(),
        }
    }

    /// Returns the kind of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::Unauthenticated => FailureKind::Unauthenticated,
            Failure::Unauthorized { .. } => FailureKind::Unauthorized,
            Failure::OperationFailure { .. } => FailureKind::OperationFailure,
            Failure::RetriesExhausted { .. } => FailureKind::RetriesExhausted,
            Failure::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    /// Returns `true` for failures produced by a gate.
    pub fn is_gate_rejection(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Unauthenticated | FailureKind::Unauthorized
        )
    }
}

impl From<BoxError> for Failure {
    fn from(cause: BoxError) -> Self {
        Failure::OperationFailure { cause }
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::operation(message)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::operation(message)
    }
}

/// The kind of a [`Failure`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// See [`Failure::Unauthenticated`]
    Unauthenticated,
    /// See [`Failure::Unauthorized`]
    Unauthorized,
    /// See [`Failure::OperationFailure`]
    OperationFailure,
    /// See [`Failure::RetriesExhausted`]
    RetriesExhausted,
    /// See [`Failure::Cancelled`]
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Unauthenticated => write!(f, "unauthenticated"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::OperationFailure => write!(f, "operation_failure"),
            FailureKind::RetriesExhausted => write!(f, "retries_exhausted"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Errors raised while building a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A retry policy must allow at least one attempt
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}
