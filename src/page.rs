//! What a page fetcher hands back to the iterator.

use crate::{
    link::{parse_link_header, Links},
    options::query_params,
};
use http::{header::LINK, HeaderMap};

/// Items of one page together with the response metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, info: PageInfo) -> Self {
        Self { items, info }
    }

    /// A page with response headers. Pagination fields are filled from the `Link` header.
    pub fn from_headers(items: Vec<T>, headers: HeaderMap) -> Self {
        Self::new(items, PageInfo::from_headers(headers))
    }

    /// A page that ends the pagination.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, PageInfo::default())
    }
}

/// Response metadata of a single page.
///
/// Page numbers are `0` when the server didn't advertise them.
#[derive(Debug, Clone, Default)]
pub struct PageInfo {
    pub next_page: u64,
    pub prev_page: u64,
    pub first_page: u64,
    pub last_page: u64,

    /// Set instead of `next_page` when the next `page` parameter isn't a number.
    pub next_page_token: Option<String>,
    pub cursor: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,

    pub headers: HeaderMap,
}

impl PageInfo {
    /// Builds page metadata out of the `Link` header in `headers`.
    ///
    /// Links whose target doesn't parse, or that carry none of `cursor`, `page`, `since`,
    /// `before` and `after`, are skipped.
    pub fn from_headers(headers: HeaderMap) -> Self {
        let mut info = Self {
            headers,
            ..Self::default()
        };

        for link in info.links() {
            let Ok(url) = link.parsed_url() else {
                continue;
            };

            let mut query = query_params(&url);
            query.retain(|_, value| !value.is_empty());

            if let Some(cursor) = query.remove("cursor") {
                if link.rel == "next" {
                    info.cursor = Some(cursor);
                }
                continue;
            }

            let page = query.remove("page").or_else(|| query.remove("since"));
            let before = query.remove("before");
            let after = query.remove("after");

            if page.is_none() && before.is_none() && after.is_none() {
                continue;
            }

            let number = page.as_deref().and_then(|page| page.parse().ok());

            match link.rel.as_str() {
                "next" => {
                    match number {
                        Some(number) => info.next_page = number,
                        None => info.next_page_token = page,
                    }
                    info.after = after;
                }
                "prev" => {
                    info.prev_page = number.unwrap_or_default();
                    info.before = before;
                }
                "first" => info.first_page = number.unwrap_or_default(),
                "last" => info.last_page = number.unwrap_or_default(),
                _ => {}
            }
        }

        info
    }

    /// Whether the server advertised any way to get another page.
    pub fn has_next_page(&self) -> bool {
        self.next_page != 0
            || self.next_page_token.is_some()
            || self.cursor.is_some()
            || self.after.is_some()
    }

    /// The raw `Link` header, if present and valid UTF-8.
    pub fn link(&self) -> Option<&str> {
        self.headers.get(LINK).and_then(|value| value.to_str().ok())
    }

    /// Parsed relations of the `Link` header. Empty when there's no header.
    pub fn links(&self) -> Links {
        self.link().map(parse_link_header).unwrap_or_default()
    }
}
