use tower::Layer;

use crate::gate::{AuthenticationGate, AuthorizationGate};

/// Layer requiring an authenticated identity.
///
/// Wraps an operation in an [`AuthenticationGate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

impl<I> Layer<I> for Authenticated {
    type Service = AuthenticationGate<I>;

    fn layer(&self, inner: I) -> Self::Service {
        AuthenticationGate::new(inner)
    }
}

/// Layer requiring the identity to act under a specific role.
///
/// The role is fixed at composition time. Authorization compares roles only;
/// pair it with [`Authenticated`] when the identity must also be
/// authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    role: String,
}

impl Authorized {
    /// Creates an authorization requirement for the given role.
    pub fn for_role(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }

    /// Returns the required role.
    pub fn role(&self) -> &str {
        &self.role
    }
}

impl<I> Layer<I> for Authorized {
    type Service = AuthorizationGate<I>;

    fn layer(&self, inner: I) -> Self::Service {
        AuthorizationGate::new(inner, self.role.clone())
    }
}
