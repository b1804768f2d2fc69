/// Caller identity checked by the gate layers.
///
/// Supplied per invocation as the leading argument and never stored by a
/// layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Whether the caller has proven who they are
    pub is_authenticated: bool,
    /// Role the caller acts under
    pub role: String,
}

impl Identity {
    /// Creates an authenticated identity acting under `role`.
    pub fn authenticated(role: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            role: role.into(),
        }
    }

    /// Creates an unauthenticated identity with an empty role.
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            role: String::new(),
        }
    }
}

/// Call arguments that lead with an [`Identity`].
///
/// Gates only read the identity; the arguments themselves are forwarded to
/// the inner layer untouched.
///
/// # Examples
///
/// ```
/// use policy_chain::{Identified, Identity};
///
/// let user = Identity::authenticated("admin");
/// let args = (&user, 42);
///
/// assert_eq!(args.identity().role, "admin");
/// ```
pub trait Identified {
    /// Returns the identity carried by these arguments.
    fn identity(&self) -> &Identity;
}

impl Identified for Identity {
    fn identity(&self) -> &Identity {
        self
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn identity(&self) -> &Identity {
        (**self).identity()
    }
}

macro_rules! identified_tuple {
    ($($rest:ident),+) => {
        impl<$($rest),+> Identified for (Identity, $($rest),+) {
            fn identity(&self) -> &Identity {
                &self.0
            }
        }

        impl<$($rest),+> Identified for (&Identity, $($rest),+) {
            fn identity(&self) -> &Identity {
                self.0
            }
        }
    };
}

identified_tuple!(T1);
identified_tuple!(T1, T2);
identified_tuple!(T1, T2, T3);
identified_tuple!(T1, T2, T3, T4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_identity_is_not_authenticated() {
        let anon = Identity::anonymous();
        assert!(!anon.is_authenticated);
        assert!(anon.role.is_empty());
    }

    #[test]
    fn tuples_expose_leading_identity() {
        let owned = (Identity::authenticated("user"), "payload");
        assert_eq!(owned.identity().role, "user");

        let admin = Identity::authenticated("admin");
        let borrowed = (&admin, 7_u8);
        assert!(borrowed.identity().is_authenticated);
        assert_eq!((&borrowed).identity(), &admin);
    }

    #[test]
    fn wider_tuples_lead_with_identity() {
        let admin = Identity::authenticated("admin");
        assert_eq!((&admin, 1, "two").identity().role, "admin");
        assert_eq!((admin.clone(), 1, 2, 3, 4).identity().role, "admin");
    }
}
