use crate::{error::Failure, identity::Identified, invocable::Invocable};

/// Gate that rejects unauthenticated callers.
///
/// The inner operation only runs when the leading [`Identity`] argument is
/// authenticated; otherwise the call fails with [`Failure::Unauthenticated`]
/// and nothing beneath this gate executes.
///
/// [`Identity`]: crate::Identity
///
/// # Examples
///
/// ```
/// use policy_chain::{AuthenticationGate, Identity, Invocable, Operation};
///
/// let op = Operation::new("dashboard", |_: Identity| Ok::<_, &str>("granted"));
/// let gate = AuthenticationGate::new(op);
///
/// assert!(gate.invoke(Identity::authenticated("user")).is_ok());
/// assert!(gate.invoke(Identity::anonymous()).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticationGate<I> {
    inner: I,
}

impl<I> AuthenticationGate<I> {
    /// Wraps `inner` behind an authentication check.
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    /// Returns the wrapped operation.
    pub fn get_ref(&self) -> &I {
        &self.inner
    }
}

impl<A, I> Invocable<A> for AuthenticationGate<I>
where
    A: Identified,
    I: Invocable<A>,
{
    type Output = I::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        if !args.identity().is_authenticated {
            tracing::warn!(
                target: "policy_chain::gate",
                operation = self.inner.name(),
                "rejected unauthenticated caller"
            );
            return Err(Failure::Unauthenticated);
        }
        self.inner.invoke(args)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Gate that rejects callers lacking a required role.
///
/// Compares `identity.role` against the role fixed at composition time. On
/// mismatch the call fails with [`Failure::Unauthorized`] without invoking
/// the inner operation.
#[derive(Debug, Clone)]
pub struct AuthorizationGate<I> {
    inner: I,
    required_role: String,
}

impl<I> AuthorizationGate<I> {
    /// Wraps `inner` behind a check for `required_role`.
    pub fn new(inner: I, required_role: impl Into<String>) -> Self {
        Self {
            inner,
            required_role: required_role.into(),
        }
    }

    /// Returns the role this gate requires.
    pub fn required_role(&self) -> &str {
        &self.required_role
    }

    /// Returns the wrapped operation.
    pub fn get_ref(&self) -> &I {
        &self.inner
    }
}

impl<A, I> Invocable<A> for AuthorizationGate<I>
where
    A: Identified,
    I: Invocable<A>,
{
    type Output = I::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        let role = &args.identity().role;
        if *role != self.required_role {
            tracing::warn!(
                target: "policy_chain::gate",
                operation = self.inner.name(),
                role = %role,
                required_role = %self.required_role,
                "rejected caller without required role"
            );
            return Err(Failure::Unauthorized {
                required_role: self.required_role.clone(),
            });
        }
        self.inner.invoke(args)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
