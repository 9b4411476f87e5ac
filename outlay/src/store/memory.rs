//! In-process store that evaluates predicates directly.

use std::sync::{RwLock, RwLockReadGuard};

use outlay_sql::{FilterExpr, Row, compare_rows};

use super::{ReadRequest, ReadStore};
use crate::cancel::CancelToken;
use crate::constants::CANCEL_POLL_INTERVAL;
use crate::error::{Error, Result};

/// A `Vec`-backed store.
///
/// Filters and sort orders go through the same predicate model the SQL
/// adapters render, so both return the same rows for the same request.
#[derive(Debug)]
pub struct MemoryStore<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryStore<T> {
    /// An empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// A store holding `rows`.
    #[must_use]
    pub const fn from_rows(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Append a row.
    pub fn insert(&self, row: T) -> Result<()> {
        self.rows
            .write()
            .map_err(|_| Error::storage("memory store lock poisoned"))?
            .push(row);
        Ok(())
    }

    /// Number of stored rows.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>> {
        self.rows
            .read()
            .map_err(|_| Error::storage("memory store lock poisoned"))
    }
}

/// Rows matching `filter`, polling `cancel` as the scan goes.
fn scan<'a, T: Row>(
    rows: &'a [T],
    filter: &FilterExpr,
    cancel: &CancelToken,
) -> Result<Vec<&'a T>> {
    let mut matched = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if i % CANCEL_POLL_INTERVAL == 0 && cancel.is_aborted() {
            return Err(cancel.abort_error());
        }
        if filter.matches(row) {
            matched.push(row);
        }
    }
    Ok(matched)
}

impl<T> ReadStore<T> for MemoryStore<T>
where
    T: Row + Clone + Send + Sync,
{
    fn count(&self, filter: &FilterExpr, cancel: &CancelToken) -> Result<u64> {
        let rows = self.read()?;
        let matched = scan(&rows, filter, cancel)?;
        Ok(matched.len() as u64)
    }

    fn query(&self, request: &ReadRequest, cancel: &CancelToken) -> Result<Vec<T>> {
        let rows = self.read()?;
        let mut matched = scan(&rows, &request.filter, cancel)?;
        matched.sort_by(|a, b| compare_rows(*a, *b, &request.sort));

        let Some(limit) = request.limit else {
            return Ok(matched.into_iter().cloned().collect());
        };
        Ok(matched
            .into_iter()
            .skip(request.offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
