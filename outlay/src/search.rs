//! Search criteria and the predicate builder.
//!
//! Turns a [`SearchCriteria`] into an [`ExpenseQuery`]: a storage-neutral
//! scope filter (owner, category, date bucket, description, fuzzy amount),
//! an optional keyset bound decoded from the continuation cursor, and the
//! sort order. All validation happens here, before storage is touched.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use outlay_sql::{
    Cursor, FilterExpr, KeysetCondition, Operator, SortDir, SortField, Value, simple,
};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bucket::{index, parse_calendar_date};
use crate::config::EngineConfig;
use crate::constants::{DEFAULT_CATEGORY_PAGE_SIZE, MAX_DESCRIPTION_SEARCH_LEN};
use crate::error::{Error, Result};
use crate::model::{date_text, timestamp_text};
use crate::store::ReadRequest;

static DESCRIPTION_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\p{L}0-9_\-.,!?;:"\s']*$"#).expect("valid regex"));

static CATEGORY_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\p{L}_\-.,!?;:"\s']*$"#).expect("valid regex"));

// ============================================================================
// SORT ORDER
// ============================================================================

/// How much of the reference date a search matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DateGranularity {
    /// Exact calendar date.
    #[default]
    Day,
    /// Same calendar year and ISO week.
    ///
    /// Days in the ISO week that straddles New Year share a week number
    /// with the other end of their calendar year: 2025-12-29 (week 1)
    /// matches 2025-01-01 through 2025-01-05.
    Week,
    /// Same year and month.
    Month,
    /// Same year.
    Year,
}

/// Fields an expense search can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Creation timestamp.
    CreatedAt,
    /// Amount in minor units.
    Amount,
    /// Calendar date.
    Date,
}

impl SortKey {
    /// Every sort key, in declaration order.
    pub const ALL: [Self; 3] = [Self::CreatedAt, Self::Amount, Self::Date];

    /// Storage column backing this key.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Amount => "amount",
            Self::Date => "date",
        }
    }

    /// Name used in the transport form (`createdAt_DESC`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Amount => "amount",
            Self::Date => "date",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Coerce decoded cursor text to this key's storage value.
    fn coerce(self, text: &str) -> Result<Value> {
        let text = text.trim();
        match self {
            Self::CreatedAt => DateTime::parse_from_rfc3339(text)
                .map(|ts| Value::String(timestamp_text(&ts.with_timezone(&Utc))))
                .map_err(|_| Error::InvalidSearch(format!("cursor is not a timestamp: {text:?}"))),
            Self::Amount => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| Error::InvalidSearch(format!("cursor is not an integer: {text:?}"))),
            Self::Date => parse_calendar_date(text)
                .map(|date| Value::String(date_text(date)))
                .map_err(|_| Error::InvalidSearch(format!("cursor is not a date: {text:?}"))),
        }
    }
}

/// Sort key plus direction, e.g. `createdAt_DESC`.
///
/// Only the keys in [`SortKey`] are accepted, so a caller can never order by
/// an arbitrary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOrder {
    /// Field to order by.
    pub key: SortKey,
    /// Direction.
    pub dir: SortDir,
}

impl SortOrder {
    /// Create a sort order.
    #[must_use]
    pub const fn new(key: SortKey, dir: SortDir) -> Self {
        Self { key, dir }
    }

    /// `ORDER BY` fields: the key, then the id as tie-breaker in the same direction.
    #[must_use]
    pub fn sort_fields(&self) -> Vec<SortField> {
        vec![
            SortField::new(self.key.column(), self.dir),
            SortField::new("id", self.dir),
        ]
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(SortKey::CreatedAt, SortDir::Desc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.key.as_str(), self.dir.as_sql())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSearch(format!("unknown sort order {s:?}"));
        let (key, dir) = s.rsplit_once('_').ok_or_else(invalid)?;
        let key = SortKey::from_name(key).ok_or_else(invalid)?;
        let dir = match dir {
            "ASC" => SortDir::Asc,
            "DESC" => SortDir::Desc,
            _ => return Err(invalid()),
        };
        Ok(Self::new(key, dir))
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// EXPENSE SEARCH
// ============================================================================

/// A declarative expense search, as decoded from the transport request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    /// Reference date. Without it no date predicate is applied.
    pub date: Option<String>,
    /// How much of `date` to match on.
    pub date_type: DateGranularity,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Target amount for a fuzzy match.
    pub amount: Option<i64>,
    /// Page size; the configured default when absent.
    pub first: Option<u32>,
    /// End cursor of the previous page.
    pub after: Option<String>,
    /// Sort order.
    pub order: SortOrder,
}

/// A validated expense search, ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    scope: FilterExpr,
    keyset: Option<FilterExpr>,
    order: SortOrder,
    first: u32,
}

impl ExpenseQuery {
    /// Filter for the total count: every predicate except the keyset bound.
    #[must_use]
    pub const fn count_filter(&self) -> &FilterExpr {
        &self.scope
    }

    /// Filter for the page itself: the scope plus the keyset bound.
    #[must_use]
    pub fn page_filter(&self) -> FilterExpr {
        match &self.keyset {
            Some(keyset) => self.scope.clone().and_also(keyset.clone()),
            None => self.scope.clone(),
        }
    }

    /// Page read, fetching one row beyond `first` to detect a next page.
    #[must_use]
    pub fn page_request(&self) -> ReadRequest {
        ReadRequest::new(self.page_filter())
            .sort(self.order.sort_fields())
            .limit(self.first.saturating_add(1))
    }

    /// Requested sort order.
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    /// Requested page size.
    #[must_use]
    pub const fn first(&self) -> u32 {
        self.first
    }

    /// Whether the search continues from a cursor.
    #[must_use]
    pub const fn has_cursor(&self) -> bool {
        self.keyset.is_some()
    }
}

/// Inclusive integer bounds of a fuzzy amount match.
///
/// `[ceil(a * (100 - t) / 100), floor(a * (100 + t) / 100)]`, so a target of
/// 1000 at 20 % matches 800 through 1200.
#[must_use]
pub fn amount_range(amount: i64, tolerance_percent: u32) -> (i64, i64) {
    let a = i128::from(amount);
    let t = i128::from(tolerance_percent.min(100));
    let low = (a * (100 - t)).div_euclid(100) + i128::from((a * (100 - t)).rem_euclid(100) != 0);
    let high = (a * (100 + t)).div_euclid(100);
    let clamp = |v: i128| i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX });
    (clamp(low), clamp(high))
}

/// Validate `criteria` and lower it to an [`ExpenseQuery`] scoped to `owner`.
///
/// `category`, when given, restricts the search to that category id.
pub fn build_expense_query(
    owner: &str,
    criteria: &SearchCriteria,
    category: Option<&str>,
    config: &EngineConfig,
) -> Result<ExpenseQuery> {
    if owner.is_empty() {
        return Err(Error::InvalidSearch("owner is required".into()));
    }

    let first = criteria.first.unwrap_or(config.default_page_size);
    if first == 0 || first > config.max_page_size {
        return Err(Error::InvalidSearch(format!(
            "first must be between 1 and {}, got {first}",
            config.max_page_size
        )));
    }

    let mut scope = simple("owner_id", Operator::Eq, Value::String(owner.to_string()));

    if let Some(category) = category {
        scope = scope.and_also(simple(
            "category_id",
            Operator::Eq,
            Value::String(category.to_string()),
        ));
    }

    if let Some(date) = &criteria.date {
        let date = parse_calendar_date(date)?;
        let bucket = index(date);
        let year = simple("year", Operator::Eq, Value::Int(i64::from(bucket.year)));
        scope = match criteria.date_type {
            DateGranularity::Year => scope.and_also(year),
            DateGranularity::Month => scope.and_also(year).and_also(simple(
                "month",
                Operator::Eq,
                Value::Int(i64::from(bucket.month)),
            )),
            DateGranularity::Week => scope.and_also(year).and_also(simple(
                "iso_week",
                Operator::Eq,
                Value::Int(i64::from(bucket.iso_week)),
            )),
            DateGranularity::Day => {
                scope.and_also(simple("date", Operator::Eq, Value::String(date_text(date))))
            },
        };
    }

    if let Some(term) = &criteria.description {
        validate_description(term)?;
        scope = scope.and_also(simple(
            "description",
            Operator::IContains,
            Value::String(term.clone()),
        ));
    }

    if let Some(amount) = criteria.amount {
        if amount < 1 {
            return Err(Error::InvalidSearch(format!(
                "amount must be at least 1, got {amount}"
            )));
        }
        let (low, high) = amount_range(amount, config.amount_tolerance_percent);
        scope = scope.and_also(simple(
            "amount",
            Operator::Between,
            Value::Array(vec![Value::Int(low), Value::Int(high)]),
        ));
    }

    let keyset = match criteria.after.as_deref().map(str::trim) {
        Some(after) if !after.is_empty() => Some(keyset_bound(after, criteria.order)?),
        _ => None,
    };

    Ok(ExpenseQuery {
        scope,
        keyset,
        order: criteria.order,
        first,
    })
}

fn validate_description(term: &str) -> Result<()> {
    let len = term.chars().count();
    if len == 0 || len > MAX_DESCRIPTION_SEARCH_LEN {
        return Err(Error::InvalidSearch(format!(
            "description must be 1 to {MAX_DESCRIPTION_SEARCH_LEN} characters"
        )));
    }
    if !DESCRIPTION_TERM.is_match(term) {
        return Err(Error::InvalidSearch(
            "description can not have special characters".into(),
        ));
    }
    Ok(())
}

/// Decode `after` and build the bound selecting rows past it.
///
/// Tuple cursors give `(key, id)` bounds; value-only cursors give a strict
/// bound on the key alone.
fn keyset_bound(after: &str, order: SortOrder) -> Result<FilterExpr> {
    let cursor = Cursor::decode(after)?;
    let value = order.key.coerce(&cursor.value)?;

    let mut bounds = vec![(SortField::new(order.key.column(), order.dir), value)];
    if let Some(id) = cursor.id {
        if id.is_empty() {
            return Err(Error::InvalidSearch("cursor id is empty".into()));
        }
        bounds.push((SortField::new("id", order.dir), Value::String(id)));
    }

    KeysetCondition::after(bounds)
        .map(|condition| condition.to_filter_expr())
        .ok_or_else(|| Error::InvalidSearch("empty cursor".into()))
}

// ============================================================================
// CATEGORY LISTING
// ============================================================================

/// Page/page-size request for offset listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicPagination {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl Default for BasicPagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_CATEGORY_PAGE_SIZE,
        }
    }
}

impl BasicPagination {
    /// Create a pagination request.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }
}

/// A validated category listing, ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryQuery {
    scope: FilterExpr,
    pagination: BasicPagination,
}

impl CategoryQuery {
    /// Filter for the total count and the page.
    #[must_use]
    pub const fn count_filter(&self) -> &FilterExpr {
        &self.scope
    }

    /// Page read, ordered by name.
    #[must_use]
    pub fn page_request(&self) -> ReadRequest {
        let BasicPagination { page, page_size } = self.pagination;
        ReadRequest::new(self.scope.clone())
            .sort(vec![
                SortField::new("name", SortDir::Asc),
                SortField::new("id", SortDir::Asc),
            ])
            .page(page, page_size)
    }

    /// Requested page.
    #[must_use]
    pub const fn pagination(&self) -> BasicPagination {
        self.pagination
    }
}

/// Validate a category listing request for `owner`.
///
/// `search` is a case-insensitive substring of the category name.
pub fn build_category_query(
    owner: &str,
    pagination: BasicPagination,
    search: Option<&str>,
    config: &EngineConfig,
) -> Result<CategoryQuery> {
    if owner.is_empty() {
        return Err(Error::InvalidSearch("owner is required".into()));
    }
    if pagination.page == 0 {
        return Err(Error::InvalidSearch("page must be at least 1".into()));
    }
    if pagination.page_size == 0 || pagination.page_size > config.max_category_page_size {
        return Err(Error::InvalidPageSize(format!(
            "page size must be between 1 and {}, got {}",
            config.max_category_page_size, pagination.page_size
        )));
    }

    let mut scope = simple("owner_id", Operator::Eq, Value::String(owner.to_string()));
    if let Some(term) = search.filter(|term| !term.is_empty()) {
        if !CATEGORY_TERM.is_match(term) {
            return Err(Error::InvalidSearch(
                "search input can not have special characters".into(),
            ));
        }
        scope = scope.and_also(simple(
            "name",
            Operator::IContains,
            Value::String(term.to_string()),
        ));
    }

    Ok(CategoryQuery { scope, pagination })
}
