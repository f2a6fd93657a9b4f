//! The pagination loop.
//!
//! [`PageIter`] binds a function that fetches one page and turns it into a lazy stream over all
//! items of all pages. After each page it follows the `rel="next"` relation of the `Link` header by
//! merging that URL's query into the options for the next call.
//!
//! Errors don't travel through the stream. Once it ends, [`PageIter::err`] tells whether it ended
//! because the data ran out or because something failed.

mod fetcher;

pub use fetcher::PageFuture;

use crate::{
    context::Context,
    error::Error,
    options::{merge_options, query_params, QueryOptions},
    page::{Page, PageInfo},
};
use fetcher::Fetcher;
use futures::stream::{self, Stream};
use std::{fmt::Display, future::Future, pin::Pin};

/// A stream of items returned by [`PageIter::all`].
pub type ItemsStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Iterates over every item of a paginated endpoint.
///
/// `T` is the item type, `O` the options record passed to every fetch and `E` the fetcher's error.
/// Bind exactly one fetcher taking zero, one or two path arguments:
///
/// ```ignore
/// let mut users = PageIter::from_fn(|ctx, opts| client.users().list_all(ctx, opts));
/// let mut repos = PageIter::from_fn1(|ctx, org, opts| client.repos().list_by_org(ctx, org, opts), "github");
/// let mut alerts = PageIter::from_fn2(
///     |ctx, owner, repo, opts| client.dependabot().list_repo_alerts(ctx, owner, repo, opts),
///     "rust-lang",
///     "rust",
/// );
/// ```
///
/// Each fetch receives a clone of the current options and a clone of the [`Context`]. Binding no
/// fetcher, more than one, or a number of arguments that doesn't match the fetcher is reported as
/// an error when the stream is consumed, before anything is fetched.
///
/// An iterator is driven by one stream at a time, which the `&mut self` receiver of
/// [`PageIter::all`] enforces. Options given to [`PageIter::opts`] are owned by the iterator; to
/// run two sessions with the same starting options give each its own clone.
pub struct PageIter<'f, T, O, E> {
    fetchers: Vec<Fetcher<'f, T, O, E>>,
    ctx: Context,
    args: Vec<String>,
    opts: Option<O>,

    raw: Option<PageInfo>,
    err: Option<Error<E>>,
}

impl<'f, T, O, E> Default for PageIter<'f, T, O, E> {
    fn default() -> Self {
        Self {
            fetchers: Vec::new(),
            ctx: Context::background(),
            args: Vec::new(),
            opts: None,
            raw: None,
            err: None,
        }
    }
}

impl<'f, T, O, E> PageIter<'f, T, O, E> {
    /// An iterator without a fetcher. Use one of the `bind*` methods before consuming it.
    pub fn new() -> Self {
        Self::default()
    }

    /// An iterator over an endpoint without path arguments.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: 'f + Send + Fn(Context, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        Self::new().bind(f)
    }

    /// An iterator over an endpoint taking one path argument, like an organization name.
    pub fn from_fn1<F, Fut>(f: F, arg1: impl Into<String>) -> Self
    where
        F: 'f + Send + Fn(Context, String, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        Self::new().bind1(f).args([arg1])
    }

    /// An iterator over an endpoint taking two path arguments, like an owner and a repository.
    pub fn from_fn2<F, Fut>(f: F, arg1: impl Into<String>, arg2: impl Into<String>) -> Self
    where
        F: 'f + Send + Fn(Context, String, String, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        Self::new().bind2(f).args([arg1.into(), arg2.into()])
    }

    pub fn bind<F, Fut>(mut self, f: F) -> Self
    where
        F: 'f + Send + Fn(Context, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        self.fetchers.push(Fetcher::fn0(f));
        self
    }

    pub fn bind1<F, Fut>(mut self, f: F) -> Self
    where
        F: 'f + Send + Fn(Context, String, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        self.fetchers.push(Fetcher::fn1(f));
        self
    }

    pub fn bind2<F, Fut>(mut self, f: F) -> Self
    where
        F: 'f + Send + Fn(Context, String, String, O) -> Fut,
        Fut: 'f + Send + Future<Output = Result<Page<T>, E>>,
    {
        self.fetchers.push(Fetcher::fn2(f));
        self
    }

    /// Sets the context handed to every fetch. Defaults to [`Context::background`].
    pub fn ctx(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Replaces the path arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the options of the first fetch. Without them `O::default()` is used.
    pub fn opts(mut self, opts: O) -> Self {
        self.opts = Some(opts);
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The current options. After a session they hold the query of the last followed
    /// `rel="next"` link.
    pub fn options(&self) -> Option<&O> {
        self.opts.as_ref()
    }

    pub fn into_options(self) -> Option<O> {
        self.opts
    }

    /// Metadata of the most recently fetched page.
    pub fn raw(&self) -> Option<&PageInfo> {
        self.raw.as_ref()
    }

    /// The error that ended the last session, if any.
    pub fn err(&self) -> Option<&Error<E>> {
        self.err.as_ref()
    }

    pub fn take_err(&mut self) -> Option<Error<E>> {
        self.err.take()
    }

    fn validate(&self) -> Result<&Fetcher<'f, T, O, E>, Error<E>> {
        let fetcher = match self.fetchers.as_slice() {
            [] => return Err(Error::NoFetcher),
            [fetcher] => fetcher,
            _ => return Err(Error::MultipleFetchers),
        };

        let expected = fetcher.arity();
        if self.args.len() != expected {
            return Err(Error::WrongArgCount {
                expected,
                got: self.args.len(),
                args: self.args.join(","),
            });
        }

        if let Some(index) = self.args.iter().position(String::is_empty) {
            return Err(Error::EmptyArgument(index));
        }

        Ok(fetcher)
    }
}

impl<'f, T, O, E> PageIter<'f, T, O, E>
where
    T: Send,
    O: Send + Default + Clone + QueryOptions,
    E: Send + Display,
{
    /// Returns a lazy stream over the items of every page.
    ///
    /// A page is fetched only once all items of the previous one were pulled, and the context is
    /// checked before every item and every fetch. Dropping the stream stops the pagination. When it
    /// ends, [`PageIter::err`] holds the reason unless the data simply ran out.
    pub fn all(&mut self) -> ItemsStream<'_, T> {
        Box::pin(stream::unfold(Session::new(self), Session::next_item))
    }

    async fn fetch_page(&mut self) -> Result<Vec<T>, Error<E>> {
        let opts = self.opts.get_or_insert_with(O::default).clone();

        let future = {
            let fetcher = self.validate()?;
            tracing::debug!(arity = fetcher.arity(), args = ?self.args, "fetching page");

            fetcher
                .fetch(self.ctx.clone(), &self.args, opts)
                .ok_or_else(|| Error::WrongArgCount {
                    expected: fetcher.arity(),
                    got: self.args.len(),
                    args: self.args.join(","),
                })?
        };

        let Page { items, info } = future.await.map_err(Error::Fetch)?;

        tracing::debug!(
            items = items.len(),
            next_page = info.next_page,
            "page received"
        );

        self.raw = Some(info);
        Ok(items)
    }

    /// Prepares the options for the next fetch. `false` when there is no next page.
    fn turn_page(&mut self) -> Result<bool, Error<E>> {
        let Some(info) = self.raw.as_ref() else {
            return Ok(false);
        };

        if !info.has_next_page() {
            tracing::debug!("last page reached");
            return Ok(false);
        }

        let links = info.links();
        let Some(next) = links.find_by_rel("next").filter(|link| !link.url.is_empty()) else {
            tracing::debug!(link = ?info.link(), "no next relation in the Link header, stopping");
            return Ok(false);
        };

        let url = next.parsed_url().map_err(|source| Error::CursorParse {
            url: next.url.clone(),
            source,
        })?;

        let params = query_params(&url);
        if params.is_empty() {
            // The same request would come back again and again.
            tracing::debug!(url = %next.url, "next link carries no query, stopping");
            return Ok(false);
        }

        tracing::trace!(url = %next.url, "following next link");
        merge_options(self.opts.get_or_insert_with(O::default), &params)?;

        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Validate,
    Fetch,
    Turn,
    Done,
}

/// State of one pass over the pages.
struct Session<'a, 'f, T, O, E> {
    iter: &'a mut PageIter<'f, T, O, E>,
    page: std::vec::IntoIter<T>,
    step: Step,
}

impl<'a, 'f, T, O, E> Session<'a, 'f, T, O, E>
where
    T: Send,
    O: Send + Default + Clone + QueryOptions,
    E: Send + Display,
{
    fn new(iter: &'a mut PageIter<'f, T, O, E>) -> Self {
        Self {
            iter,
            page: Vec::new().into_iter(),
            step: Step::Validate,
        }
    }

    async fn next_item(mut self) -> Option<(T, Self)> {
        loop {
            match self.step {
                Step::Done => return None,
                Step::Validate => {
                    self.iter.err = None;
                    self.iter.opts.get_or_insert_with(O::default);

                    match self.iter.validate() {
                        Ok(_) => self.step = Step::Fetch,
                        Err(err) => self.fail(err),
                    }
                    continue;
                }
                Step::Fetch | Step::Turn => {}
            }

            if let Some(err) = self.iter.ctx.err() {
                self.fail(err.into());
                continue;
            }

            if let Some(item) = self.page.next() {
                return Some((item, self));
            }

            match self.step {
                Step::Fetch => match self.iter.fetch_page().await {
                    Ok(items) => {
                        self.page = items.into_iter();
                        self.step = Step::Turn;
                    }
                    Err(err) => self.fail(err),
                },
                Step::Turn => match self.iter.turn_page() {
                    Ok(true) => self.step = Step::Fetch,
                    Ok(false) => self.step = Step::Done,
                    Err(err) => self.fail(err),
                },
                Step::Validate | Step::Done => {}
            }
        }
    }

    fn fail(&mut self, err: Error<E>) {
        if err.is_cancellation() {
            tracing::debug!(error = %err, "pagination cancelled");
        } else {
            tracing::warn!(error = %err, "pagination stopped");
        }

        self.iter.err = Some(err);
        self.page = Vec::new().into_iter();
        self.step = Step::Done;
    }
}
