//! Pagination utilities for cursor and keyset pagination.
//!
//! # Pagination Strategies
//!
//! | Strategy   | Jump to Page | Performance | Stability | Use Case                  |
//! |------------|--------------|-------------|-----------|---------------------------|
//! | **Offset** | Yes          | O(n) skip   | Unstable* | Category listings         |
//! | **Keyset** | No           | O(1)        | Stable    | Expense search, feeds     |
//!
//! *Unstable = results shift if data changes between requests
//!
//! # Keyset Pagination Example
//!
//! ```
//! use outlay_sql::{Cursor, KeysetCondition, PageInfo, SortDir, SortField, Value, sqlite};
//!
//! // The client sends back the end cursor of the previous page
//! let token = Cursor::new("2024-01-15T10:00:00.000000Z").with_id("e-42").encode();
//! let cursor = Cursor::decode(&token).unwrap();
//!
//! let order = [
//!     SortField::new("created_at", SortDir::Desc),
//!     SortField::new("id", SortDir::Desc),
//! ];
//! let keyset = KeysetCondition::after(vec![
//!     (order[0].clone(), Value::String(cursor.value)),
//!     (order[1].clone(), Value::String(cursor.id.unwrap_or_default())),
//! ])
//! .unwrap();
//!
//! let result = sqlite("expenses")
//!     .filter_expr(keyset.to_filter_expr())
//!     .sorts(&order)
//!     .limit(21)
//!     .build();
//!
//! assert!(result.sql.contains("ORDER BY created_at DESC, id DESC LIMIT 21"));
//!
//! // 21 rows back for a page of 20 means there is another page
//! let page_info = PageInfo::new(21, 20);
//! assert!(page_info.has_next_page);
//! ```

mod cursor;
mod keyset;
mod page_info;

// Re-export all public items
pub use cursor::{Cursor, CursorError, CursorValue, decode_value, encode_value};
pub use keyset::KeysetCondition;
pub use page_info::PageInfo;
