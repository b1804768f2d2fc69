use std::fmt;
use std::sync::Arc;

use crate::error::Failure;

/// A callable with a fixed argument and result shape.
///
/// Base operations and every layer wrapping them implement this trait. A
/// layer holds the next `Invocable` in the chain and decides whether, and
/// how, to call it.
pub trait Invocable<A> {
    /// Value produced on success.
    type Output;

    /// Invokes the callable with `args`.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] when this layer or anything beneath it fails.
    fn invoke(&self, args: A) -> Result<Self::Output, Failure>;

    /// Name of the underlying operation, used in logs.
    fn name(&self) -> &str {
        "operation"
    }
}

impl<A, I: Invocable<A> + ?Sized> Invocable<A> for &I {
    type Output = I::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        (**self).invoke(args)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A, I: Invocable<A> + ?Sized> Invocable<A> for Box<I> {
    type Output = I::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        (**self).invoke(args)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A, I: Invocable<A> + ?Sized> Invocable<A> for Arc<I> {
    type Output = I::Output;

    fn invoke(&self, args: A) -> Result<Self::Output, Failure> {
        (**self).invoke(args)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A named base operation built from a closure or function.
///
/// The closure may fail with any error convertible into [`Failure`]; plain
/// strings and boxed errors become [`Failure::OperationFailure`].
///
/// # Examples
///
/// ```
/// use policy_chain::{Invocable, Operation};
///
/// let add = Operation::new("add", |(a, b): (i64, i64)| Ok::<_, &str>(a + b));
///
/// assert_eq!(add.invoke((2, 3)).unwrap(), 5);
/// assert_eq!(add.name(), "add");
/// ```
#[derive(Clone)]
pub struct Operation<F> {
    name: &'static str,
    func: F,
}

impl<F> Operation<F> {
    /// Wraps `func` under the given name.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> fmt::Debug for Operation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<A, T, E, F> Invocable<A> for Operation<F>
where
    F: Fn(A) -> Result<T, E>,
    E: Into<Failure>,
{
    type Output = T;

    fn invoke(&self, args: A) -> Result<T, Failure> {
        (self.func)(args).map_err(Into::into)
    }

    fn name(&self) -> &str {
        self.name
    }
}
