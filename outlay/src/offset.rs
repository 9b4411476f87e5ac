//! Page-number pagination for small listings.

use serde::Serialize;

use crate::error::{Error, Result};

/// One page of an offset listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage<T> {
    /// Items on the requested page.
    pub results: Vec<T>,
    /// Matches across all pages.
    pub total_count: u64,
    /// `ceil(total_count / page_size)`.
    pub total_pages: u64,
    /// `page * page_size < total_count`.
    pub has_next_page: bool,
}

impl<T> OffsetPage<T> {
    /// Wrap an already sliced page.
    ///
    /// ```
    /// use outlay::OffsetPage;
    ///
    /// let page = OffsetPage::new(vec!["a"; 5], 25, 3, 10).unwrap();
    /// assert_eq!(page.total_pages, 3);
    /// assert!(!page.has_next_page);
    /// ```
    pub fn new(results: Vec<T>, total_count: u64, page: u32, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize("page size must be positive".into()));
        }
        let size = u64::from(page_size);
        Ok(Self {
            results,
            total_count,
            total_pages: total_count.div_ceil(size),
            has_next_page: u64::from(page) * size < total_count,
        })
    }
}
