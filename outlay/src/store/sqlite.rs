//! SQLite storage adapter.
//!
//! Predicates are rendered with the SQLite dialect and executed through
//! rusqlite. Timestamps and dates are stored in their canonical text forms,
//! so byte order in `ORDER BY` and keyset comparisons is time order.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use outlay_sql::{FilterExpr, QueryResult, Value, sqlite};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, params, params_from_iter};
use tracing::debug;

use super::{ReadRequest, ReadStore};
use crate::cancel::CancelToken;
use crate::constants::{CATEGORIES_TABLE, EXPENSES_TABLE};
use crate::error::{Error, Result};
use crate::model::{Category, Expense, date_text, timestamp_text};

/// VM instructions between cancellation checks.
const PROGRESS_HANDLER_OPS: i32 = 1000;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id          TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (owner_id, name)
);

CREATE TABLE IF NOT EXISTS expenses (
    id           TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL,
    category_id  TEXT NOT NULL,
    amount       INTEGER NOT NULL CHECK (amount >= 1),
    currency     TEXT NOT NULL,
    description  TEXT NOT NULL,
    date         TEXT NOT NULL,
    year         INTEGER NOT NULL,
    month        INTEGER NOT NULL,
    iso_week     INTEGER NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_expenses_owner_created ON expenses (owner_id, created_at, id);
CREATE INDEX IF NOT EXISTS idx_expenses_owner_amount ON expenses (owner_id, amount, id);
CREATE INDEX IF NOT EXISTS idx_expenses_owner_date ON expenses (owner_id, date, id);
CREATE INDEX IF NOT EXISTS idx_expenses_owner_month ON expenses (owner_id, year, month);
CREATE INDEX IF NOT EXISTS idx_expenses_owner_week ON expenses (owner_id, year, iso_week);
";

/// A record type stored in one table.
trait Table: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

impl Table for Expense {
    const TABLE: &'static str = EXPENSES_TABLE;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "owner_id",
        "category_id",
        "amount",
        "currency",
        "description",
        "date",
        "year",
        "month",
        "iso_week",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            category_id: row.get(2)?,
            amount: row.get(3)?,
            currency: row.get(4)?,
            description: row.get(5)?,
            date: parse_column(row, 6, |s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))?,
            year: row.get(7)?,
            month: row.get(8)?,
            iso_week: row.get(9)?,
            created_at: parse_column(row, 10, parse_timestamp)?,
            updated_at: parse_column(row, 11, parse_timestamp)?,
        })
    }
}

impl Table for Category {
    const TABLE: &'static str = CATEGORIES_TABLE;
    const COLUMNS: &'static [&'static str] = &["id", "owner_id", "name", "created_at", "updated_at"];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            created_at: parse_column(row, 3, parse_timestamp)?,
            updated_at: parse_column(row, 4, parse_timestamp)?,
        })
    }
}

fn parse_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|ts| ts.with_timezone(&Utc))
}

fn parse_column<T, E>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    parse: impl FnOnce(&str) -> std::result::Result<T, E>,
) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    parse(&text).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn to_sql_value(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null | Value::Array(_) => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Int(i) => Sql::Integer(*i),
        Value::Float(f) => Sql::Real(*f),
        Value::String(s) => Sql::Text(s.clone()),
    }
}

fn is_interrupt(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::OperationInterrupted)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

/// Run `f` with a progress handler that interrupts the statement once
/// `cancel` is aborted.
fn interruptible<R>(
    conn: &Connection,
    cancel: &CancelToken,
    f: impl FnOnce(&Connection) -> rusqlite::Result<R>,
) -> Result<R> {
    cancel.check()?;
    let token = cancel.clone();
    conn.progress_handler(PROGRESS_HANDLER_OPS, Some(move || token.is_aborted()));
    let result = f(conn);
    conn.progress_handler(0, None::<fn() -> bool>);

    match result {
        Ok(value) => Ok(value),
        Err(e) if is_interrupt(&e) => Err(cancel.abort_error()),
        Err(e) => Err(Error::storage(e)),
    }
}

/// Expenses and categories in a SQLite database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path).map_err(Error::storage)?)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory().map_err(Error::storage)?)
    }

    /// Wrap an existing connection, applying the schema.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(Error::storage)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert an expense.
    pub fn insert_expense(&self, expense: &Expense) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO expenses (id, owner_id, category_id, amount, currency, description, \
             date, year, month, iso_week, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                expense.id,
                expense.owner_id,
                expense.category_id,
                expense.amount,
                expense.currency,
                expense.description,
                date_text(expense.date),
                expense.year,
                expense.month,
                expense.iso_week,
                timestamp_text(&expense.created_at),
                timestamp_text(&expense.updated_at),
            ],
        )
        .map_err(Error::storage)?;
        Ok(())
    }

    /// Persist a new date for an existing expense, with its buckets.
    ///
    /// Returns `false` if no expense has that id.
    pub fn update_expense_date(&self, expense: &Expense) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE expenses SET date = ?1, year = ?2, month = ?3, iso_week = ?4, \
                 updated_at = ?5 WHERE id = ?6",
                params![
                    date_text(expense.date),
                    expense.year,
                    expense.month,
                    expense.iso_week,
                    timestamp_text(&expense.updated_at),
                    expense.id,
                ],
            )
            .map_err(Error::storage)?;
        Ok(changed > 0)
    }

    /// Insert a category. Names are unique per owner.
    pub fn insert_category(&self, category: &Category) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO categories (id, owner_id, name, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category.id,
                category.owner_id,
                category.name,
                timestamp_text(&category.created_at),
                timestamp_text(&category.updated_at),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::InvalidInput(format!("{} already exists", category.name))
            } else {
                Error::storage(e)
            }
        })?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::storage("sqlite connection lock poisoned"))
    }

    fn count_rows<T: Table>(&self, filter: &FilterExpr, cancel: &CancelToken) -> Result<u64> {
        let query = sqlite(T::TABLE)
            .count()
            .filter_expr(filter.clone())
            .build();
        debug!(sql = %query.sql, params = query.params.len(), "sqlite count");

        let conn = self.lock()?;
        let count: i64 = interruptible(&conn, cancel, |conn| {
            conn.query_row(&query.sql, params_from_iter(bind(&query)), |row| row.get(0))
        })?;
        u64::try_from(count).map_err(Error::storage)
    }

    fn query_rows<T: Table>(&self, request: &ReadRequest, cancel: &CancelToken) -> Result<Vec<T>> {
        let mut builder = sqlite(T::TABLE)
            .fields(T::COLUMNS)
            .filter_expr(request.filter.clone())
            .sorts(&request.sort);
        if let Some(limit) = request.limit {
            builder = builder.limit(limit);
            if request.offset > 0 {
                builder = builder.offset(request.offset);
            }
        }
        let query = builder.build();
        debug!(sql = %query.sql, params = query.params.len(), "sqlite query");

        let conn = self.lock()?;
        let rows = interruptible(&conn, cancel, |conn| {
            let mut stmt = conn.prepare(&query.sql)?;
            let rows = stmt.query_map(params_from_iter(bind(&query)), T::from_row)?;
            rows.collect::<rusqlite::Result<Vec<T>>>()
        })?;
        debug!(rows = rows.len(), "sqlite rows fetched");
        Ok(rows)
    }
}

fn bind(query: &QueryResult) -> Vec<rusqlite::types::Value> {
    query.params.iter().map(to_sql_value).collect()
}

impl ReadStore<Expense> for SqliteStore {
    fn count(&self, filter: &FilterExpr, cancel: &CancelToken) -> Result<u64> {
        self.count_rows::<Expense>(filter, cancel)
    }

    fn query(&self, request: &ReadRequest, cancel: &CancelToken) -> Result<Vec<Expense>> {
        self.query_rows(request, cancel)
    }
}

impl ReadStore<Category> for SqliteStore {
    fn count(&self, filter: &FilterExpr, cancel: &CancelToken) -> Result<u64> {
        self.count_rows::<Category>(filter, cancel)
    }

    fn query(&self, request: &ReadRequest, cancel: &CancelToken) -> Result<Vec<Category>> {
        self.query_rows(request, cancel)
    }
}
