//! Errors that end a pagination session.

use crate::{context::ContextError, options::MergeError};
use thiserror::Error;

/// The reason a [`crate::PageIter`] stream stopped early. `E` is the page fetcher's own error.
///
/// Every variant is terminal: the stream yields nothing after the error is recorded.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("no func provided")]
    NoFetcher,

    #[error("more than one func provided")]
    MultipleFetchers,

    #[error("wrong number of arguments: expected {expected}, got {got} [{args}]")]
    WrongArgCount {
        expected: usize,
        got: usize,
        args: String,
    },

    #[error("empty argument[{0}]")]
    EmptyArgument(usize),

    #[error("page fetch failed: {0}")]
    Fetch(E),

    #[error("invalid next page url '{url}': {source}")]
    CursorParse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl<E> Error<E> {
    /// The iterator was misconfigured and never issued a fetch.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoFetcher
                | Self::MultipleFetchers
                | Self::WrongArgCount { .. }
                | Self::EmptyArgument(_)
        )
    }

    /// The session was stopped through its [`crate::Context`] rather than by a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Context(_))
    }

    /// The page fetcher's error, if that's what stopped the session.
    pub fn as_fetch(&self) -> Option<&E> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}
