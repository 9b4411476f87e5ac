//! Cursor-paginated result pages.

use outlay_sql::{Cursor, PageInfo};
use serde::Serialize;

/// An item paired with the cursor that resumes right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge<T> {
    /// Opaque continuation cursor.
    pub cursor: String,
    /// The item.
    pub node: T,
}

/// One page of a cursor search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in sort order.
    pub edges: Vec<Edge<T>>,
    /// Matches for the whole search, ignoring the cursor.
    pub total_count: u64,
    /// Navigation flags and boundary cursors.
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Shape an over-fetched read into a page.
    ///
    /// `rows` holds up to `first + 1` items; anything past `first` only
    /// signals that another page exists and is dropped.
    ///
    /// ```
    /// use outlay::Page;
    /// use outlay_sql::Cursor;
    ///
    /// let page = Page::assemble(vec![3, 2, 1], 7, 2, false, |n: &i64| Cursor::new(*n));
    /// assert_eq!(page.nodes().copied().collect::<Vec<_>>(), [3, 2]);
    /// assert!(page.page_info.has_next_page);
    /// assert_eq!(page.total_count, 7);
    /// ```
    pub fn assemble<F>(
        mut rows: Vec<T>,
        total_count: u64,
        first: u32,
        has_previous_page: bool,
        cursor_of: F,
    ) -> Self
    where
        F: Fn(&T) -> Cursor,
    {
        let first = first as usize;
        let fetched = rows.len();
        rows.truncate(first);

        let edges: Vec<Edge<T>> = rows
            .into_iter()
            .map(|node| Edge {
                cursor: cursor_of(&node).encode(),
                node,
            })
            .collect();

        let page_info = PageInfo::new(fetched, first)
            .with_has_previous_page(has_previous_page)
            .with_start_cursor(edges.first().map(|edge| edge.cursor.clone()))
            .with_end_cursor(edges.last().map(|edge| edge.cursor.clone()));

        Self {
            edges,
            total_count,
            page_info,
        }
    }

    /// Items on the page.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }

    /// Take the items, dropping cursors and metadata.
    #[must_use]
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }

    /// Number of items on the page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Cursor to pass as `after` for the following page.
    #[must_use]
    pub fn end_cursor(&self) -> Option<&str> {
        self.page_info.end_cursor.as_deref()
    }
}
