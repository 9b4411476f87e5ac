//! Error types for the expense query engine.

use outlay_sql::CursorError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by engine operations.
///
/// Validation variants are raised before any storage call. Storage failures
/// and aborted calls are passed through unchanged, never turned into an
/// empty page.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Text that should be a calendar date could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The continuation cursor is not valid base64/UTF-8.
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// The search input is malformed or internally inconsistent, including a
    /// cursor whose value does not fit the sort field.
    #[error("invalid search: {0}")]
    InvalidSearch(String),

    /// A record on the write path failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A page size of zero (or outside the allowed range) was requested.
    #[error("invalid page size: {0}")]
    InvalidPageSize(String),

    /// The caller cancelled the operation.
    #[error("query cancelled")]
    Cancelled,

    /// The operation ran past its deadline.
    #[error("query timed out")]
    Timeout,

    /// Opaque failure from the storage layer.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying storage error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Engine configuration is invalid (bad TOML, out-of-range limits).
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a storage backend error.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Whether the error was caused by caller input rather than the system.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate(_)
                | Self::InvalidCursor(_)
                | Self::InvalidSearch(_)
                | Self::InvalidInput(_)
                | Self::InvalidPageSize(_)
        )
    }

    /// Whether the storage call was aborted by cancellation or deadline.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout)
    }
}
