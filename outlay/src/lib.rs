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
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::cast_possible_truncation)] // u32 page sizes to usize and back

//! # outlay - Expense query engine
//!
//! Searches an owner's expenses by calendar bucket, description substring
//! and fuzzy amount, and pages through the results with opaque keyset
//! cursors. Categories get a simpler page-number listing.
//!
//! Storage is injected through [`ReadStore`]. [`MemoryStore`] evaluates
//! predicates in process; [`SqliteStore`] (feature `sqlite`, on by default)
//! renders them to SQL.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::Utc;
//! use outlay::prelude::*;
//!
//! let expenses = MemoryStore::new();
//! for (amount, date) in [(900, "2024-01-03"), (1150, "2024-01-20"), (1300, "2024-02-01")] {
//!     let input = NewExpense {
//!         category_id: "food".into(),
//!         amount,
//!         currency: "EUR".into(),
//!         description: None,
//!         date: date.into(),
//!     };
//!     expenses.insert(Expense::create("u1", input, Utc::now())?)?;
//! }
//!
//! let engine = ExpenseEngine::new(expenses, MemoryStore::<Category>::new(), EngineConfig::default());
//! let criteria = SearchCriteria {
//!     date: Some("2024-01-10".into()),
//!     date_type: DateGranularity::Month,
//!     amount: Some(1000),
//!     order: "amount_ASC".parse()?,
//!     ..SearchCriteria::default()
//! };
//!
//! let page = engine.search_expenses("u1", &criteria, None, &CancelToken::new())?;
//! let amounts: Vec<i64> = page.nodes().map(|e| e.amount).collect();
//! assert_eq!(amounts, [900, 1150]);
//! assert!(!page.page_info.has_next_page);
//! # Ok::<(), outlay::Error>(())
//! ```
//!
//! ## Time Buckets
//!
//! ```
//! let bucket = outlay::bucket::index_str("2021-01-03")?;
//! // Sunday of ISO week 53 of 2020, but still calendar year 2021
//! assert_eq!((bucket.year, bucket.iso_week, bucket.month), (2021, 53, 0));
//! # Ok::<(), outlay::Error>(())
//! ```
//!
//! ## Configuration
//!
//! ```
//! let config = outlay::EngineConfig::from_toml_str("max_page_size = 50")?;
//! assert_eq!(config.max_page_size, 50);
//! assert_eq!(config.default_page_size, 10);
//! # Ok::<(), outlay::Error>(())
//! ```

pub mod bucket;
mod cancel;
mod config;
pub mod constants;
mod engine;
mod error;
pub mod model;
mod offset;
mod page;
pub mod search;
pub mod store;

pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use engine::ExpenseEngine;
pub use error::{Error, Result};
pub use model::{Category, Expense, NewExpense};
pub use offset::OffsetPage;
pub use outlay_sql::{Cursor, CursorError, PageInfo};
pub use page::{Edge, Page};
pub use search::{BasicPagination, DateGranularity, SearchCriteria, SortKey, SortOrder};
pub use store::{MemoryStore, ReadRequest, ReadStore};

#[cfg(feature = "sqlite")]
pub use store::SqliteStore;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        BasicPagination, CancelToken, Category, DateGranularity, EngineConfig, Error, Expense,
        ExpenseEngine, MemoryStore, NewExpense, OffsetPage, Page, ReadStore, Result,
        SearchCriteria, SortKey, SortOrder,
    };

    #[cfg(feature = "sqlite")]
    pub use crate::SqliteStore;
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================

#[cfg(test)]
mod api_contracts {
    use static_assertions::assert_impl_all;

    use super::*;

    // Engine and stores are shared across request threads
    assert_impl_all!(CancelToken: Send, Sync, Clone);
    assert_impl_all!(EngineConfig: Send, Sync, Clone, Default);
    assert_impl_all!(MemoryStore<Expense>: Send, Sync, ReadStore<Expense>);
    assert_impl_all!(MemoryStore<Category>: Send, Sync, ReadStore<Category>);
    assert_impl_all!(ExpenseEngine<MemoryStore<Expense>, MemoryStore<Category>>: Send, Sync);

    #[cfg(feature = "sqlite")]
    assert_impl_all!(SqliteStore: Send, Sync, ReadStore<Expense>, ReadStore<Category>);

    // Values handed to the transport layer
    assert_impl_all!(Page<Expense>: Send, Sync, Clone, serde::Serialize);
    assert_impl_all!(OffsetPage<Category>: Send, Sync, Clone, serde::Serialize);
    assert_impl_all!(Error: Send, Sync, std::error::Error);
    assert_impl_all!(SearchCriteria: Send, Sync, Clone, Default, serde::de::DeserializeOwned);
}
