//! PageInfo struct and methods for pagination responses.

use serde::Serialize;

/// Page information for cursor-paginated responses.
///
/// `has_next_page` is computed from an over-fetch: ask storage for
/// `first + 1` rows and pass how many came back.
///
/// ```
/// use outlay_sql::PageInfo;
///
/// let info = PageInfo::new(11, 10)
///     .with_has_previous_page(true)
///     .with_end_cursor(Some("MTA=".to_string()));
/// assert!(info.has_next_page);
/// assert!(info.has_previous_page);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether the page was requested with a cursor.
    pub has_previous_page: bool,
    /// Cursor of the first item on the page.
    pub start_cursor: Option<String>,
    /// Cursor of the last item on the page.
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Create page info from the number of rows fetched for a page of `first`.
    ///
    /// There is a next page only when storage returned more than `first` rows.
    #[must_use]
    pub const fn new(fetched: usize, first: usize) -> Self {
        Self {
            has_next_page: fetched > first,
            has_previous_page: false,
            start_cursor: None,
            end_cursor: None,
        }
    }

    /// Set whether there are previous items.
    #[must_use]
    pub const fn with_has_previous_page(mut self, has_previous_page: bool) -> Self {
        self.has_previous_page = has_previous_page;
        self
    }

    /// Set the start cursor.
    #[must_use]
    pub fn with_start_cursor(mut self, cursor: Option<String>) -> Self {
        self.start_cursor = cursor;
        self
    }

    /// Set the end cursor.
    #[must_use]
    pub fn with_end_cursor(mut self, cursor: Option<String>) -> Self {
        self.end_cursor = cursor;
        self
    }
}
