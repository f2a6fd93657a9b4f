#![cfg_attr(docsrs, feature(doc_cfg))]
//! Walk every item of a paginated REST endpoint as one lazy stream.
//!
//! Many APIs, GitHub's among them, return list results in pages and advertise how to get the
//! next one in a `Link` response header:
//!
//! ```text
//! Link: <https://api.github.com/organizations/9919/repos?page=2>; rel="next",
//!       <https://api.github.com/organizations/9919/repos?page=12>; rel="last"
//! ```
//!
//! [`PageIter`] takes a function that fetches a single page, calls it, yields the page's items,
//! reads the `rel="next"` URL, and copies that URL's query parameters into your options value
//! before fetching again. The options type is yours: derive [`QueryOptions`] on it and annotate
//! the fields with the query parameter they bind to.
//!
//! ```ignore
//! #[derive(Debug, Default, Clone, QueryOptions)]
//! struct ListOptions {
//!     #[query(name = "page,omitempty")]
//!     page: i64,
//!     #[query(name = "per_page,omitempty")]
//!     per_page: i64,
//! }
//!
//! #[derive(Debug, Default, Clone, QueryOptions)]
//! struct RepositoryListByOrgOptions {
//!     #[query(name = "type,omitempty")]
//!     kind: String,
//!     #[query(name = "since,omitempty")]
//!     since: Option<DateTime<Utc>>,
//!     #[query(flatten)]
//!     list: ListOptions,
//! }
//!
//! let mut repos = PageIter::from_fn1(
//!     |ctx, org, opts| client.list_by_org(ctx, org, opts),
//!     "github",
//! );
//!
//! let names: Vec<_> = repos.all().map(|repo| repo.name).collect().await;
//!
//! // The stream has no error channel, ask the iterator once it's done.
//! if let Some(err) = repos.err() {
//!     eprintln!("listing stopped early: {err}");
//! }
//! ```
//!
//! The stream is strictly sequential. Nothing is fetched until it is polled, and dropping it
//! stops the pagination.

// Generated `QueryOptions` impls refer to `::link_pager`, which must also resolve inside this
// crate.
extern crate self as link_pager;

pub mod context;
pub mod error;
pub mod iter;
pub mod link;
pub mod options;
pub mod page;

pub use context::{Context, ContextError};
pub use error::Error;
pub use iter::{ItemsStream, PageFuture, PageIter};
pub use link::{parse_link_header, Link, Links};
pub use options::{
    merge_field, merge_options, query_params, FromQueryValue, MergeError, QueryOptions,
    QueryParams, ValueError,
};
pub use page::{Page, PageInfo};

#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use link_pager_macros::QueryOptions;

#[doc = "Everything needed to paginate an endpoint"]
pub mod prelude {
    pub use crate::{Context, Page, PageInfo, PageIter, QueryOptions};
}

#[cfg(test)]
mod test_utils;
