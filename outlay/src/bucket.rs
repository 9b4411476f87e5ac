//! Time buckets derived from an expense's calendar date.
//!
//! The year, ISO week and zero-based month are stored next to the date so
//! that week/month/year searches are plain equality checks.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};

/// Derived bucket integers for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    /// Calendar year of the date.
    pub year: i32,
    /// ISO-8601 week number, 1..=53.
    pub iso_week: u32,
    /// Zero-based month, 0..=11.
    pub month: u32,
}

/// Compute the buckets for `date`.
///
/// `year` is the calendar year, not the ISO week-based year, so
/// 2024-12-30 is year 2024, week 1.
///
/// ```
/// use chrono::NaiveDate;
/// use outlay::bucket::index;
///
/// let bucket = index(NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
/// assert_eq!((bucket.year, bucket.iso_week, bucket.month), (2024, 1, 11));
/// ```
#[must_use]
pub fn index(date: NaiveDate) -> TimeBucket {
    TimeBucket {
        year: date.year(),
        iso_week: date.iso_week().week(),
        month: date.month0(),
    }
}

/// Parse caller-supplied date text.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the date in the timestamp's
/// own offset) and naive `YYYY-MM-DDTHH:MM:SS[.fff]`.
pub fn parse_calendar_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }
    Err(Error::InvalidDate(text.to_string()))
}

/// Parse `text` and compute its buckets.
pub fn index_str(text: &str) -> Result<TimeBucket> {
    parse_calendar_date(text).map(index)
}
