//! Page fetchers bound by the number of path arguments they take.

use crate::{context::Context, page::Page};
use futures::{future::BoxFuture, FutureExt};
use std::future::Future;

/// A future resolving to one fetched page.
pub type PageFuture<'f, T, E> = BoxFuture<'f, Result<Page<T>, E>>;

type Fn0<'f, T, O, E> = Box<dyn 'f + Send + Fn(Context, O) -> PageFuture<'f, T, E>>;
type Fn1<'f, T, O, E> = Box<dyn 'f + Send + Fn(Context, String, O) -> PageFuture<'f, T, E>>;
type Fn2<'f, T, O, E> =
    Box<dyn 'f + Send + Fn(Context, String, String, O) -> PageFuture<'f, T, E>>;

pub(crate) enum Fetcher<'f, T, O, E> {
    Fn0(Fn0<'f, T, O, E>),
    Fn1(Fn1<'f, T, O, E>),
    Fn2(Fn2<'f, T, O, E>),
}

impl<'f, T, O, E> Fetcher<'f, T, O, E> {
    pub(crate) fn fn0<F, Fut>(f: F) -> Self
    where
        F: 'f + Send + Fn(Context, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        Self::Fn0(Box::new(move |ctx, opts| f(ctx, opts).boxed()))
    }

    pub(crate) fn fn1<F, Fut>(f: F) -> Self
    where
        F: 'f + Send + Fn(Context, String, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        Self::Fn1(Box::new(move |ctx, arg1, opts| f(ctx, arg1, opts).boxed()))
    }

    pub(crate) fn fn2<F, Fut>(f: F) -> Self
    where
        F: 'f + Send + Fn(Context, String, String, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        Self::Fn2(Box::new(move |ctx, arg1, arg2, opts| {
            f(ctx, arg1, arg2, opts).boxed()
        }))
    }

    /// Number of path arguments the fetcher requires.
    pub(crate) fn arity(&self) -> usize {
        match self {
            Self::Fn0(_) => 0,
            Self::Fn1(_) => 1,
            Self::Fn2(_) => 2,
        }
    }

    /// Starts a fetch. `None` if `args` doesn't match the arity.
    pub(crate) fn fetch(&self, ctx: Context, args: &[String], opts: O) -> Option<PageFuture<'f, T, E>> {
        match (self, args) {
            (Self::Fn0(f), []) => Some(f(ctx, opts)),
            (Self::Fn1(f), [arg1]) => Some(f(ctx, arg1.clone(), opts)),
            (Self::Fn2(f), [arg1, arg2]) => Some(f(ctx, arg1.clone(), arg2.clone(), opts)),
            _ => None,
        }
    }
}
