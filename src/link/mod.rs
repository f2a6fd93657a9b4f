//! Parser for RFC 5988 `Link` header values.
//!
//! The parser never fails. Segments it can't make sense of turn into links with an empty URL,
//! and a missing `rel="next"` simply means there are no more pages.

use std::{collections::HashMap, convert::Infallible, ops::Deref, str::FromStr};
use url::Url;

/// Relative link targets are resolved against this origin. Only their path and query are used.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// A single `<url>; key="value"` relation of a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Value of the `rel` attribute, empty if there was none.
    pub rel: String,
    /// Every attribute of the segment, `rel` included.
    pub params: HashMap<String, String>,
}

impl Link {
    /// Parses the link target. A relative target like `/repos?page=2` is accepted.
    pub fn parsed_url(&self) -> Result<Url, url::ParseError> {
        match Url::parse(&self.url) {
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)?.join(&self.url),
            parsed => parsed,
        }
    }
}

/// Relations of a `Link` header in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<Link>);

impl Links {
    /// Returns the first link whose `rel` equals `rel`. Duplicates are not an error.
    pub fn find_by_rel(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|link| link.rel == rel)
    }

    pub fn into_vec(self) -> Vec<Link> {
        self.0
    }
}

impl Deref for Links {
    type Target = [Link];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Links {
    type Item = Link;
    type IntoIter = std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Link>> for Links {
    fn from(links: Vec<Link>) -> Self {
        Self(links)
    }
}

impl FromStr for Links {
    type Err = Infallible;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        Ok(parse_link_header(header))
    }
}

impl FromStr for Link {
    type Err = Infallible;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        Ok(parse_link(segment))
    }
}

/// Splits a `Link` header value into its relations.
///
/// An empty header produces a single link with an empty URL.
pub fn parse_link_header(header: &str) -> Links {
    header.trim().split(',').map(parse_link).collect::<Vec<_>>().into()
}

fn parse_link(segment: &str) -> Link {
    let mut attrs = segment.trim().split(';');

    let url = attrs
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '<' || c == '>')
        .to_owned();

    let params: HashMap<_, _> = attrs
        .filter_map(|attr| attr.trim().split_once('='))
        .map(|(key, value)| (key.to_owned(), value.trim_matches('"').to_owned()))
        .collect();

    let rel = params.get("rel").cloned().unwrap_or_default();

    Link { url, rel, params }
}
