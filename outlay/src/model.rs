//! Expense and category records.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use outlay_sql::{Cursor, Row, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bucket::{TimeBucket, index, parse_calendar_date};
use crate::constants::{MAX_CATEGORY_NAME_LEN, MAX_DESCRIPTION_LEN};
use crate::error::{Error, Result};
use crate::search::SortKey;

pub(crate) static CATEGORY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}0-9_\-.\s']*$").expect("valid regex"));

/// Canonical text form of a timestamp.
///
/// Fixed-width UTC with microseconds, so byte order equals time order.
#[must_use]
pub fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Canonical text form of a calendar date (`YYYY-MM-DD`).
#[must_use]
pub fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Input for [`Expense::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// Category the expense is filed under.
    pub category_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Optional free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Calendar date of the expense, in any format
    /// [`parse_calendar_date`] accepts.
    pub date: String,
}

/// A single expense.
///
/// `year`, `month` and `iso_week` are derived from `date` when the expense
/// is created or re-dated, and are never recomputed on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Record id (UUID v4 text).
    pub id: String,
    /// Owner the record belongs to.
    pub owner_id: String,
    /// Category the record is filed under.
    pub category_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Free text, possibly empty.
    pub description: String,
    pub(crate) date: NaiveDate,
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) iso_week: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Validate `input` and build a new expense for `owner_id`.
    ///
    /// Timestamps are truncated to microseconds, the precision of their
    /// stored text form.
    pub fn create(owner_id: impl Into<String>, input: NewExpense, now: DateTime<Utc>) -> Result<Self> {
        if input.amount < 1 {
            return Err(Error::InvalidInput(format!(
                "amount must be at least 1, got {}",
                input.amount
            )));
        }
        if !is_currency_code(&input.currency) {
            return Err(Error::InvalidInput(format!(
                "currency must be a three-letter ISO-4217 code, got {:?}",
                input.currency
            )));
        }
        if input.description.as_deref() == Some("") {
            return Err(Error::InvalidInput("description can not be empty".into()));
        }
        let description = input.description.unwrap_or_default();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(Error::InvalidInput(format!(
                "description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        let date = parse_calendar_date(&input.date)?;
        let now = now.trunc_subsecs(6);
        let bucket = index(date);

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            category_id: input.category_id,
            amount: input.amount,
            currency: input.currency,
            description,
            date,
            year: bucket.year,
            month: bucket.month,
            iso_week: bucket.iso_week,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move the expense to another date, recomputing its buckets.
    pub fn set_date(&mut self, date: NaiveDate, now: DateTime<Utc>) {
        let bucket = index(date);
        self.date = date;
        self.year = bucket.year;
        self.month = bucket.month;
        self.iso_week = bucket.iso_week;
        self.updated_at = now.trunc_subsecs(6);
    }

    /// Calendar date of the expense.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Buckets stored with the expense.
    #[must_use]
    pub const fn bucket(&self) -> TimeBucket {
        TimeBucket {
            year: self.year,
            iso_week: self.iso_week,
            month: self.month,
        }
    }

    /// Cursor pointing at this expense for the given sort key.
    pub fn cursor(&self, key: SortKey) -> Cursor {
        let cursor = match key {
            SortKey::CreatedAt => Cursor::new(timestamp_text(&self.created_at)),
            SortKey::Amount => Cursor::new(self.amount),
            SortKey::Date => Cursor::new(date_text(self.date)),
        };
        cursor.with_id(self.id.as_str())
    }
}

impl Row for Expense {
    fn column(&self, column: &str) -> Option<Value> {
        let value = match column {
            "id" => Value::String(self.id.clone()),
            "owner_id" => Value::String(self.owner_id.clone()),
            "category_id" => Value::String(self.category_id.clone()),
            "amount" => Value::Int(self.amount),
            "currency" => Value::String(self.currency.clone()),
            "description" => Value::String(self.description.clone()),
            "date" => Value::String(date_text(self.date)),
            "year" => Value::Int(i64::from(self.year)),
            "month" => Value::Int(i64::from(self.month)),
            "iso_week" => Value::Int(i64::from(self.iso_week)),
            "created_at" => Value::String(timestamp_text(&self.created_at)),
            "updated_at" => Value::String(timestamp_text(&self.updated_at)),
            _ => return None,
        };
        Some(value)
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// An expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Record id (UUID v4 text).
    pub id: String,
    /// Owner the category belongs to.
    pub owner_id: String,
    /// Lower-cased display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Validate `name` and build a new category. The name is stored lower-cased.
    pub fn create(owner_id: impl Into<String>, name: &str, now: DateTime<Utc>) -> Result<Self> {
        let len = name.chars().count();
        if len == 0 || len > MAX_CATEGORY_NAME_LEN {
            return Err(Error::InvalidInput(format!(
                "category name must be 1 to {MAX_CATEGORY_NAME_LEN} characters"
            )));
        }
        if !CATEGORY_NAME.is_match(name) {
            return Err(Error::InvalidInput(
                "category name can not have special characters".into(),
            ));
        }
        let now = now.trunc_subsecs(6);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.to_lowercase(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Row for Category {
    fn column(&self, column: &str) -> Option<Value> {
        let value = match column {
            "id" => Value::String(self.id.clone()),
            "owner_id" => Value::String(self.owner_id.clone()),
            "name" => Value::String(self.name.clone()),
            "created_at" => Value::String(timestamp_text(&self.created_at)),
            "updated_at" => Value::String(timestamp_text(&self.updated_at)),
            _ => return None,
        };
        Some(value)
    }
}
