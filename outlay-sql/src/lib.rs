// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // # Panics sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::cast_precision_loss)] // Int/float comparison in the evaluator
#![allow(clippy::double_must_use)] // Functions returning must_use types can have their own docs

//! # outlay-sql - Predicates, SQL rendering and keyset cursors
//!
//! A small, storage-neutral predicate model for the Outlay expense engine.
//! The same [`FilterExpr`] can be rendered to Postgres or `SQLite` SQL, or
//! evaluated in process against anything implementing [`Row`].
//!
//! ## Quick Start
//!
//! ```
//! # use outlay_sql::prelude::*;
//! let result = postgres("expenses")
//!     .fields(&["id", "amount", "created_at"])
//!     .filter("owner_id", Operator::Eq, Value::String("u1".into()))
//!     .sort(SortField::new("created_at", SortDir::Desc))
//!     .limit(10)
//!     .build();
//!
//! assert_eq!(
//!     result.sql,
//!     "SELECT id, amount, created_at FROM expenses WHERE owner_id = $1 ORDER BY created_at DESC LIMIT 10"
//! );
//! ```
//!
//! ## `SQLite` Dialect
//!
//! Use `sqlite()` for `SQLite` syntax (?1, ?2 instead of $1, $2):
//!
//! ```
//! # use outlay_sql::prelude::*;
//! let result = sqlite("expenses")
//!     .filter("amount", Operator::Between, Value::Array(vec![Value::Int(800), Value::Int(1200)]))
//!     .build();
//!
//! assert_eq!(result.sql, "SELECT * FROM expenses WHERE amount BETWEEN ?1 AND ?2");
//! ```
//!
//! ## Supported Operators
//!
//! | Operator    | SQL                                   |
//! |-------------|---------------------------------------|
//! | `Eq`        | `=` (`IS NULL` against `Null`)        |
//! | `Ne`        | `!=` (`IS NOT NULL` against `Null`)   |
//! | `Gt`, `Gte` | `>`, `>=`                             |
//! | `Lt`, `Lte` | `<`, `<=`                             |
//! | `IContains` | `ILIKE '%' \|\| $1 \|\| '%'`          |
//! | `Between`   | `BETWEEN $1 AND $2`                   |
//!
//! ## Cursors
//!
//! ```
//! # use outlay_sql::prelude::*;
//! assert_eq!(encode_value("2024-01-15"), "MjAyNC0wMS0xNQ==");
//! assert_eq!(decode_value("MTUwMA==").unwrap(), "1500");
//! assert!(decode_value("not-base64!!").is_err());
//! ```

mod builder;
mod dialect;
mod pagination;
mod validate;

pub use builder::{
    CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, QueryBuilder, QueryResult, Row,
    SortDir, SortField, Value, and, compare_rows, compare_values, not, or, simple,
};
pub use dialect::{Dialect, LIKE_ESCAPE, Postgres, Sqlite, escape_like};
pub use pagination::{
    Cursor, CursorError, CursorValue, KeysetCondition, PageInfo, decode_value, encode_value,
};
pub use validate::{assert_valid_sql_identifier, is_valid_sql_identifier};

/// Build a query for Postgres.
///
/// Convenience function that creates a `QueryBuilder` with Postgres dialect.
#[must_use]
pub fn postgres(table: &str) -> QueryBuilder<Postgres> {
    QueryBuilder::new(Postgres, table)
}

/// Build a query for `SQLite`.
///
/// Convenience function that creates a `QueryBuilder` with `SQLite` dialect.
#[must_use]
pub fn sqlite(table: &str) -> QueryBuilder<Sqlite> {
    QueryBuilder::new(Sqlite, table)
}

/// Prelude module for convenient imports.
///
/// ```
/// use outlay_sql::prelude::*;
/// let result = sqlite("categories").fields(&["id"]).build();
/// assert_eq!(result.sql, "SELECT id FROM categories");
/// ```
pub mod prelude {
    pub use crate::{
        CompoundFilter, Cursor, CursorError, CursorValue, Dialect, Filter, FilterExpr,
        KeysetCondition, LogicalOp, Operator, PageInfo, Postgres, QueryBuilder, QueryResult, Row,
        SortDir, SortField, Sqlite, Value, and, decode_value, encode_value, not, or, postgres,
        simple, sqlite,
    };
}


// ============================================================================
// PROPERTY TESTS
// ============================================================================


// ============================================================================
// API CONTRACT TESTS (compile-time assertions)
// ============================================================================

#[cfg(test)]
mod api_contracts {
    use static_assertions::assert_impl_all;

    // Query builder output
    assert_impl_all!(crate::QueryResult: Clone, std::fmt::Debug, PartialEq);

    // Cursor types
    assert_impl_all!(crate::Cursor: Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::CursorValue: Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::CursorError: Clone, std::fmt::Debug, PartialEq, Eq, std::error::Error);

    // PageInfo is serialized into responses
    assert_impl_all!(crate::PageInfo: Clone, std::fmt::Debug, PartialEq, Eq, Default, serde::Serialize);

    // Value and Filter types (no Eq because of Float)
    assert_impl_all!(crate::Value: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::Filter: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::FilterExpr: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::KeysetCondition: Clone, std::fmt::Debug, PartialEq);

    // Enum types
    assert_impl_all!(crate::Operator: Copy, Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::LogicalOp: Copy, Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::SortDir: Copy, Clone, std::fmt::Debug, PartialEq, Eq, std::hash::Hash);
    assert_impl_all!(crate::SortField: Clone, std::fmt::Debug, PartialEq, Eq);

    // Dialects are zero-sized and shareable across threads
    assert_impl_all!(crate::Postgres: Copy, Send, Sync, Default);
    assert_impl_all!(crate::Sqlite: Copy, Send, Sync, Default);
}
