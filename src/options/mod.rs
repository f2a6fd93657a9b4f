//! Copies the query parameters of a next-page URL into a caller's options record.
//!
//! The iterator never knows the concrete options type. It only needs the [`QueryOptions`]
//! capability, which is usually derived:
//!
//! ```ignore
//! #[derive(Default, Clone, QueryOptions)]
//! struct IssueListCommentsOptions {
//!     #[query(name = "sort,omitempty")]
//!     sort: Option<String>,
//!     #[query(name = "since,omitempty")]
//!     since: Option<DateTime<Utc>>,
//!     #[query(flatten)]
//!     list: ListOptions,
//! }
//! ```
//!
//! `#[query(name = "...")]` binds a field to the parameter named before the first comma of the
//! tag. `#[query(flatten)]` merges the same parameters into a nested options block. Fields without
//! the attribute are left alone, and so are parameters that no field binds to.
//!
//! A field type must implement [`FromQueryValue`]. Every parse failure is reported as a
//! [`MergeError`], integers included.

mod value;

pub use value::{FromQueryValue, ValueError};

use std::collections::HashMap;
use url::Url;

/// Query parameters of a next-page URL, one value per name.
pub type QueryParams = HashMap<String, String>;

/// An options record that can absorb the query parameters of a next-page URL.
pub trait QueryOptions {
    /// Overwrites every field bound to a parameter present in `params`, recursing into nested
    /// option blocks. Stops at the first field that fails to parse.
    fn apply_query_params(&mut self, params: &QueryParams) -> Result<(), MergeError>;
}

impl<O> QueryOptions for Box<O>
where
    O: ?Sized + QueryOptions,
{
    fn apply_query_params(&mut self, params: &QueryParams) -> Result<(), MergeError> {
        (**self).apply_query_params(params)
    }
}

/// A query parameter couldn't be stored in the field it binds to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot merge query parameter '{param}': {source}")]
pub struct MergeError {
    pub param: String,
    #[source]
    pub source: ValueError,
}

/// Merges `params` into `opts` in place.
pub fn merge_options<O>(opts: &mut O, params: &QueryParams) -> Result<(), MergeError>
where
    O: ?Sized + QueryOptions,
{
    tracing::trace!(params = ?params, "merging next page query into options");

    let merged = opts.apply_query_params(params);
    if let Err(err) = &merged {
        tracing::debug!(param = %err.param, error = %err.source, "options merge failed");
    }

    merged
}

/// Stores `params[name]` in `field` if the parameter is present. Used by derived
/// [`QueryOptions`] impls.
///
/// On failure the field keeps its previous value.
pub fn merge_field<V>(field: &mut V, name: &str, params: &QueryParams) -> Result<(), MergeError>
where
    V: FromQueryValue,
{
    let Some(raw) = params.get(name) else {
        return Ok(());
    };

    *field = V::from_query_value(raw).map_err(|source| MergeError {
        param: name.to_owned(),
        source,
    })?;

    Ok(())
}

/// Flattens the query string of `url`. When a parameter repeats the first value wins.
pub fn query_params(url: &Url) -> QueryParams {
    let mut params = QueryParams::new();

    for (name, value) in url.query_pairs() {
        params
            .entry(name.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    params
}
