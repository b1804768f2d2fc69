//! Post-processing of successful results.
//!
//! A transform runs exactly once per successful inner call, after the inner
//! call returns. Failures from beneath pass through untouched and the
//! transform is skipped.

use std::fmt;

use tower::Layer;

use crate::{error::Failure, invocable::Invocable};

/// Applies an infallible function to every successful result.
#[derive(Clone)]
pub struct Transform<I, F> {
    inner: I,
    f: F,
}

impl<I, F> Transform<I, F> {
    /// Wraps `inner`, mapping its successful results through `f`.
    pub fn new(inner: I, f: F) -> Self {
        Self { inner, f }
    }
}

impl<I: fmt::Debug, F> fmt::Debug for Transform<I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<A, I, F, U> Invocable<A> for Transform<I, F>
where
    I: Invocable<A>,
    F: Fn(I::Output) -> U,
{
    type Output = U;

    fn invoke(&self, args: A) -> Result<U, Failure> {
        let value = self.inner.invoke(args)?;
        Ok((self.f)(value))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Applies a fallible function to every successful result.
///
/// A failure returned by the function propagates outward as-is.
#[derive(Clone)]
pub struct TryTransform<I, F> {
    inner: I,
    f: F,
}

impl<I, F> TryTransform<I, F> {
    /// Wraps `inner`, mapping its successful results through `f`.
    pub fn new(inner: I, f: F) -> Self {
        Self { inner, f }
    }
}

impl<I: fmt::Debug, F> fmt::Debug for TryTransform<I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryTransform")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<A, I, F, U> Invocable<A> for TryTransform<I, F>
where
    I: Invocable<A>,
    F: Fn(I::Output) -> Result<U, Failure>,
{
    type Output = U;

    fn invoke(&self, args: A) -> Result<U, Failure> {
        let value = self.inner.invoke(args)?;
        (self.f)(value)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Layer producing a [`Transform`].
#[derive(Clone)]
pub struct MapLayer<F> {
    f: F,
}

impl<F> MapLayer<F> {
    /// Creates a layer mapping results through `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for MapLayer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapLayer").finish_non_exhaustive()
    }
}

impl<I, F: Clone> Layer<I> for MapLayer<F> {
    type Service = Transform<I, F>;

    fn layer(&self, inner: I) -> Self::Service {
        Transform::new(inner, self.f.clone())
    }
}

/// Layer producing a [`TryTransform`].
#[derive(Clone)]
pub struct TryMapLayer<F> {
    f: F,
}

impl<F> TryMapLayer<F> {
    /// Creates a layer mapping results through the fallible `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for TryMapLayer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryMapLayer").finish_non_exhaustive()
    }
}

impl<I, F: Clone> Layer<I> for TryMapLayer<F> {
    type Service = TryTransform<I, F>;

    fn layer(&self, inner: I) -> Self::Service {
        TryTransform::new(inner, self.f.clone())
    }
}
