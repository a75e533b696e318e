use serde::{Deserialize, Serialize};

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 6;
/// Largest page size a client may ask for.
pub const MAX_PAGE_SIZE: u32 = 30;

/// Which page of results to return, parsed from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromForm, UriDisplayQuery)]
pub struct PaginationRequest {
    /// 1-based page number.
    #[field(default = 1, validate = range(1..))]
    pub page: u32,
    /// Requested page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[field(default = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationRequest {
    /// The effective page size.
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// How many items precede this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.page_size())
    }

    /// Wrap one page of `items` out of `total`, linking neighbouring pages under `path`.
    pub fn to_paginated<T>(self, path: &str, total: u64, items: Vec<T>) -> Paginated<T> {
        let page_size = self.page_size();
        let link = |page: u32| format!("{path}?page={page}&page_size={page_size}");
        let next = (self.skip() + u64::from(page_size) < total).then(|| link(self.page + 1));
        let previous = (self.page > 1).then(|| link(self.page - 1));
        Paginated {
            count: total,
            next,
            previous,
            results: items,
        }
    }
}

/// One page of results.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of results across all pages.
    pub count: u64,
    /// Link to the next page, if there are more results.
    pub next: Option<String>,
    /// Link to the previous page, if this is not the first.
    pub previous: Option<String>,
    pub results: Vec<T>,
}
