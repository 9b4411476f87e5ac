//! Storage read interface and reference adapters.
//!
//! The engine only ever reads through [`ReadStore`]: a count over a filter,
//! and an ordered, limited query. Adapters must treat a [`CancelToken`] that
//! aborts mid-call as a failure, never as an empty result.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

use outlay_sql::{FilterExpr, SortField};

use crate::cancel::CancelToken;
use crate::error::Result;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// An ordered, limited read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    /// Rows must match this filter.
    pub filter: FilterExpr,
    /// `ORDER BY` fields, most significant first.
    pub sort: Vec<SortField>,
    /// Maximum number of rows, if bounded.
    pub limit: Option<u32>,
    /// Rows to skip. Only applied together with a limit.
    pub offset: u32,
}

impl ReadRequest {
    /// Unordered, unbounded read of everything matching `filter`.
    #[must_use]
    pub const fn new(filter: FilterExpr) -> Self {
        Self {
            filter,
            sort: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    /// Set the sort order.
    #[must_use]
    pub fn sort(mut self, sort: Vec<SortField>) -> Self {
        self.sort = sort;
        self
    }

    /// Bound the number of rows.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Select a 1-based page of `page_size` rows.
    #[must_use]
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.limit = Some(page_size);
        self.offset = page.saturating_sub(1).saturating_mul(page_size);
        self
    }
}

/// Read access to a collection of `T`.
pub trait ReadStore<T>: Send + Sync {
    /// Number of rows matching `filter`.
    fn count(&self, filter: &FilterExpr, cancel: &CancelToken) -> Result<u64>;

    /// Rows matching `request`, in its order and within its limit.
    fn query(&self, request: &ReadRequest, cancel: &CancelToken) -> Result<Vec<T>>;
}

impl<T, S: ReadStore<T> + ?Sized> ReadStore<T> for &S {
    fn count(&self, filter: &FilterExpr, cancel: &CancelToken) -> Result<u64> {
        (**self).count(filter, cancel)
    }

    fn query(&self, request: &ReadRequest, cancel: &CancelToken) -> Result<Vec<T>> {
        (**self).query(request, cancel)
    }
}

impl<T, S: ReadStore<T> + ?Sized> ReadStore<T> for Arc<S> {
    fn count(&self, filter: &FilterExpr, cancel: &CancelToken) -> Result<u64> {
        (**self).count(filter, cancel)
    }

    fn query(&self, request: &ReadRequest, cancel: &CancelToken) -> Result<Vec<T>> {
        (**self).query(request, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlay_sql::{Operator, SortDir, Value, simple};

    #[test]
    fn test_page_offsets() {
        let filter = simple("owner_id", Operator::Eq, Value::String("u1".into()));
        let request = ReadRequest::new(filter.clone()).page(3, 10);
        assert_eq!((request.limit, request.offset), (Some(10), 20));

        let request = ReadRequest::new(filter).page(0, 10);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_builder_sets_sort() {
        let request = ReadRequest::new(outlay_sql::and(vec![]))
            .sort(vec![SortField::new("name", SortDir::Asc)])
            .limit(5);
        assert_eq!(request.sort.len(), 1);
        assert_eq!(request.limit, Some(5));
        assert_eq!(request.offset, 0);
    }
}
