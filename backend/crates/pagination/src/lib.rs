//! Page-number pagination primitives shared by list endpoints.
//!
//! Handlers parse a [`PageRequest`] from the `page` and `limit` query
//! parameters, repositories answer with a [`Page`] (one slice of rows plus the
//! total row count), and the HTTP layer wraps the slice in a [`Paginated`]
//! envelope:
//!
//! ```json
//! {"count": 12, "next": "http://host/api/recipes/?page=3", "previous": "http://host/api/recipes/?page=1", "results": []}
//! ```
//!
//! # Example
//!
//! ```
//! use pagination::{Page, PageRequest, Paginated};
//! use url::Url;
//!
//! let request = PageRequest::parse(Some("2"), Some("2"), 6, 100).expect("valid request");
//! let page = Page::new(vec!["c", "d"], 5);
//! let base = Url::parse("http://localhost/api/recipes/?page=2&limit=2").expect("url");
//! let envelope = Paginated::from_page(page, &request, &base);
//!
//! assert_eq!(envelope.count, 5);
//! assert_eq!(
//!     envelope.next.as_deref(),
//!     Some("http://localhost/api/recipes/?limit=2&page=3")
//! );
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

const PAGE_PARAM: &str = "page";

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The `page` parameter was zero, negative, or not a number.
    #[error("page must be a positive integer")]
    InvalidPage,
    /// The `limit` parameter was outside `1..=max`.
    #[error("limit must be an integer between 1 and {max}")]
    InvalidLimit {
        /// Largest accepted page size.
        max: u32,
    },
}

/// A validated request for one page of a collection.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= max_limit` supplied at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from already-parsed values.
    pub fn new(page: u32, limit: u32, max_limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::InvalidPage);
        }
        if limit == 0 || limit > max_limit {
            return Err(PageRequestError::InvalidLimit { max: max_limit });
        }
        Ok(Self { page, limit })
    }

    /// Parse raw query parameter values, falling back to page 1 and
    /// `default_limit` when a parameter is absent or blank.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Result<Self, PageRequestError> {
        let page = match page.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| PageRequestError::InvalidPage)?,
            None => 1,
        };
        let limit = match limit.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| PageRequestError::InvalidLimit { max: max_limit })?,
            None => default_limit.min(max_limit),
        };
        Self::new(page, limit, max_limit)
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of rows on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    fn has_next(&self, total: u64) -> bool {
        self.offset() + u64::from(self.limit) < total
    }

    const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// One slice of a collection together with the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Number of rows across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Wrap a slice of rows and the collection total.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// An empty page of an empty collection.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Transform every row while keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// JSON envelope returned by paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Number of rows across all pages.
    pub count: u64,
    /// Absolute link to the next page, if any.
    pub next: Option<String>,
    /// Absolute link to the previous page, if any.
    pub previous: Option<String>,
    /// Rows on the current page.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build the envelope, deriving `next`/`previous` from the request URL.
    ///
    /// Every query parameter other than `page` is preserved in the links.
    #[must_use]
    pub fn from_page(page: Page<T>, request: &PageRequest, current: &Url) -> Self {
        let next = request
            .has_next(page.total)
            .then(|| page_link(current, request.page() + 1));
        let previous = request
            .has_previous()
            .then(|| page_link(current, request.page() - 1));
        Self {
            count: page.total,
            next,
            previous,
            results: page.items,
        }
    }
}

fn page_link(current: &Url, page: u32) -> String {
    let retained: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut link = current.clone();
    {
        let mut pairs = link.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
    }
    link.to_string()
}
