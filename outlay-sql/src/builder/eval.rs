//! In-process evaluation of filter expressions and sort orders.
//!
//! Gives non-SQL stores the same semantics the dialects render, so a
//! predicate set behaves identically whichever backend executes it.

use std::cmp::Ordering;

use super::types::{CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, SortDir, SortField, Value};

/// A record whose columns can be read by name.
pub trait Row {
    /// Value of `column`, or `None` if the record has no such column.
    fn column(&self, column: &str) -> Option<Value>;
}

/// Compare two scalar values.
///
/// Integers and floats compare numerically with each other; strings compare
/// by bytes (the canonical timestamp/date text forms sort chronologically).
/// `Null` sorts before everything. Mismatched types and arrays are unordered.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::String(x), Value::String(y)) => Some(x.as_bytes().cmp(y.as_bytes())),
        _ => None,
    }
}

impl FilterExpr {
    /// Whether `row` satisfies this expression.
    pub fn matches<R: Row + ?Sized>(&self, row: &R) -> bool {
        match self {
            Self::Simple(filter) => filter.matches(row),
            Self::Compound(compound) => compound.matches(row),
        }
    }
}

impl CompoundFilter {
    fn matches<R: Row + ?Sized>(&self, row: &R) -> bool {
        match self.op {
            LogicalOp::And => self.filters.iter().all(|f| f.matches(row)),
            LogicalOp::Or => self.filters.iter().any(|f| f.matches(row)),
            LogicalOp::Not => !self.filters.first().is_some_and(|f| f.matches(row)),
        }
    }
}

impl Filter {
    fn matches<R: Row + ?Sized>(&self, row: &R) -> bool {
        let Some(actual) = row.column(&self.field) else {
            return false;
        };

        match (&self.op, &self.value) {
            (Operator::Eq, Value::Null) => actual == Value::Null,
            (Operator::Ne, Value::Null) => actual != Value::Null,
            // SQL comparisons against NULL are never true
            _ if actual == Value::Null => false,
            (Operator::IContains, Value::String(term)) => match &actual {
                Value::String(s) => s.to_lowercase().contains(&term.to_lowercase()),
                _ => false,
            },
            (Operator::IContains, _) => false,
            (Operator::Between, Value::Array(bounds)) => match bounds.as_slice() {
                [low, high] => {
                    matches!(
                        compare_values(&actual, low),
                        Some(Ordering::Greater | Ordering::Equal)
                    ) && matches!(
                        compare_values(&actual, high),
                        Some(Ordering::Less | Ordering::Equal)
                    )
                },
                _ => false,
            },
            (Operator::Between, _) => false,
            (op, expected) => {
                let Some(ord) = compare_values(&actual, expected) else {
                    return false;
                };
                match op {
                    Operator::Eq => ord == Ordering::Equal,
                    Operator::Ne => ord != Ordering::Equal,
                    Operator::Gt => ord == Ordering::Greater,
                    Operator::Gte => ord != Ordering::Less,
                    Operator::Lt => ord == Ordering::Less,
                    Operator::Lte => ord != Ordering::Greater,
                    Operator::IContains | Operator::Between => false,
                }
            },
        }
    }
}

/// Order two rows by a list of sort fields, as an `ORDER BY` would.
pub fn compare_rows<R: Row + ?Sized>(a: &R, b: &R, sorts: &[SortField]) -> Ordering {
    for sort in sorts {
        let left = a.column(&sort.field).unwrap_or(Value::Null);
        let right = b.column(&sort.field).unwrap_or(Value::Null);
        let ord = compare_values(&left, &right).unwrap_or(Ordering::Equal);
        let ord = match sort.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::{and, not, or, simple};

    struct Expense {
        id: &'static str,
        amount: i64,
        description: &'static str,
    }

    impl Row for Expense {
        fn column(&self, column: &str) -> Option<Value> {
            match column {
                "id" => Some(Value::String(self.id.to_string())),
                "amount" => Some(Value::Int(self.amount)),
                "description" => Some(Value::String(self.description.to_string())),
                "category_id" => Some(Value::Null),
                _ => None,
            }
        }
    }

    fn expense(id: &'static str, amount: i64, description: &'static str) -> Expense {
        Expense {
            id,
            amount,
            description,
        }
    }

    #[test]
    fn test_between_is_inclusive() {
        let range = simple(
            "amount",
            Operator::Between,
            Value::Array(vec![Value::Int(800), Value::Int(1200)]),
        );
        assert!(range.matches(&expense("a", 800, "")));
        assert!(range.matches(&expense("a", 1200, "")));
        assert!(!range.matches(&expense("a", 1201, "")));
        assert!(!range.matches(&expense("a", 799, "")));
    }

    #[test]
    fn test_icontains_ignores_case() {
        let term = simple("description", Operator::IContains, Value::String("COFFEE".into()));
        assert!(term.matches(&expense("a", 1, "Morning coffee beans")));
        assert!(!term.matches(&expense("a", 1, "Tea")));
    }

    #[test]
    fn test_unknown_column_never_matches() {
        let expr = simple("currency", Operator::Eq, Value::String("EUR".into()));
        assert!(!expr.matches(&expense("a", 1, "")));
    }

    #[test]
    fn test_null_semantics() {
        let is_null = simple("category_id", Operator::Eq, Value::Null);
        let gt = simple("category_id", Operator::Gt, Value::String("x".into()));
        assert!(is_null.matches(&expense("a", 1, "")));
        assert!(!gt.matches(&expense("a", 1, "")));
    }

    #[test]
    fn test_compound_logic() {
        let expr = and(vec![
            simple("amount", Operator::Gte, Value::Int(10)),
            or(vec![
                simple("id", Operator::Eq, Value::String("b".into())),
                not(simple("description", Operator::IContains, Value::String("rent".into()))),
            ]),
        ]);
        assert!(expr.matches(&expense("a", 10, "groceries")));
        assert!(expr.matches(&expense("b", 10, "Rent")));
        assert!(!expr.matches(&expense("c", 10, "rent")));
        assert!(!expr.matches(&expense("b", 9, "")));
    }

    #[test]
    fn test_int_float_comparison() {
        assert_eq!(
            compare_values(&Value::Int(3), &Value::Float(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(compare_values(&Value::Int(3), &Value::String("3".into())), None);
    }

    #[test]
    fn test_compare_rows_with_tiebreak() {
        let sorts = [
            SortField::new("amount", SortDir::Desc),
            SortField::new("id", SortDir::Desc),
        ];
        let mut rows = [
            expense("a", 5, ""),
            expense("c", 7, ""),
            expense("b", 5, ""),
        ];
        rows.sort_by(|x, y| compare_rows(x, y, &sorts));
        let ids: Vec<&str> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }
}
