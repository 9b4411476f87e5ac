//! Centralized constants for the outlay crate.
//!
//! All limits and defaults are defined here for easy tuning and consistent
//! behavior across the engine.
//!
//! # Environment Variables
//!
//! Some limits can be overridden through [`EngineConfig::with_env_overrides`](crate::EngineConfig::with_env_overrides):
//!
//! | Variable                  | Default | Description                         |
//! |---------------------------|---------|-------------------------------------|
//! | `OUTLAY_MAX_PAGE_SIZE`    | 10000   | Largest `first` a search may ask for |
//! | `OUTLAY_QUERY_TIMEOUT_MS` | unset   | Deadline applied to storage calls   |
//!
//! ## Example
//!
//! ```bash
//! # Cap searches at 500 rows and give up after two seconds
//! OUTLAY_MAX_PAGE_SIZE=500
//! OUTLAY_QUERY_TIMEOUT_MS=2000
//! ```

// ============================================================================
// PAGINATION LIMITS
// ============================================================================

/// Page size used when a search does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a cursor search may request.
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Largest page size for offset listings (categories).
pub const MAX_CATEGORY_PAGE_SIZE: u32 = 100;

/// Page size used for offset listings when none is given.
pub const DEFAULT_CATEGORY_PAGE_SIZE: u32 = 10;

// ============================================================================
// SEARCH
// ============================================================================

/// Fuzzy amount tolerance, in percent either side of the target.
pub const AMOUNT_TOLERANCE_PERCENT: u32 = 20;

/// Maximum length (in characters) of a description search term.
pub const MAX_DESCRIPTION_SEARCH_LEN: usize = 155;

// ============================================================================
// WRITE PATH LIMITS
// ============================================================================

/// Maximum length (in characters) of a stored expense description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum length (in characters) of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Overrides [`MAX_PAGE_SIZE`].
pub const ENV_MAX_PAGE_SIZE: &str = "OUTLAY_MAX_PAGE_SIZE";

/// Sets the storage call deadline in milliseconds.
pub const ENV_QUERY_TIMEOUT_MS: &str = "OUTLAY_QUERY_TIMEOUT_MS";

// ============================================================================
// STORAGE
// ============================================================================

/// Expenses table name.
pub const EXPENSES_TABLE: &str = "expenses";

/// Categories table name.
pub const CATEGORIES_TABLE: &str = "categories";

/// Rows scanned by the memory store between cancellation checks.
pub const CANCEL_POLL_INTERVAL: usize = 256;
