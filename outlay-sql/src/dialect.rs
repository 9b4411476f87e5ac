//! SQL dialect implementations for Postgres and `SQLite`.
//!
//! Each dialect handles the specific syntax differences between databases.

/// Escape character used for LIKE patterns built from user text.
pub const LIKE_ESCAPE: char = '\\';

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy {
    /// Format a parameter placeholder (e.g., `$1` for Postgres, `?1` for `SQLite`).
    fn param(&self, idx: usize) -> String;

    /// Format a case-insensitive CONTAINS clause.
    ///
    /// The bound parameter is the already-escaped, lower-cased search term.
    fn icontains_clause(&self, field: &str, idx: usize) -> String;
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    #[inline]
    fn icontains_clause(&self, field: &str, idx: usize) -> String {
        format!("{field} ILIKE '%' || ${idx} || '%' ESCAPE '{LIKE_ESCAPE}'")
    }
}

/// `SQLite` dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    #[inline]
    fn icontains_clause(&self, field: &str, idx: usize) -> String {
        // SQLite has no ILIKE; compare against the lower-cased column
        format!("LOWER({field}) LIKE '%' || ?{idx} || '%' ESCAPE '{LIKE_ESCAPE}'")
    }
}

/// Lower-case a search term and escape LIKE wildcards in it.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_params() {
        let pg = Postgres;
        assert_eq!(pg.param(1), "$1");
        assert_eq!(pg.param(10), "$10");
    }

    #[test]
    fn test_sqlite_params() {
        let sqlite = Sqlite;
        assert_eq!(sqlite.param(1), "?1");
        assert_eq!(sqlite.param(10), "?10");
    }

    #[test]
    fn test_postgres_icontains_clause() {
        let pg = Postgres;
        assert_eq!(
            pg.icontains_clause("description", 2),
            r"description ILIKE '%' || $2 || '%' ESCAPE '\'"
        );
    }

    #[test]
    fn test_sqlite_icontains_clause() {
        let sqlite = Sqlite;
        assert_eq!(
            sqlite.icontains_clause("name", 1),
            r"LOWER(name) LIKE '%' || ?1 || '%' ESCAPE '\'"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Coffee"), "coffee");
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_dialect_debug() {
        assert_eq!(format!("{:?}", Postgres), "Postgres");
        assert_eq!(format!("{:?}", Sqlite), "Sqlite");
    }
}
