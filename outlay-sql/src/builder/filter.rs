//! Shared filter building functions.

use super::types::{CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, Value};
use crate::dialect::{Dialect, escape_like};

/// Build a filter expression (simple or compound).
pub(super) fn build_filter_expr_impl<D: Dialect>(
    dialect: &D,
    expr: &FilterExpr,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    match expr {
        FilterExpr::Simple(filter) => build_condition_impl(dialect, filter, start_idx),
        FilterExpr::Compound(compound) => build_compound_filter_impl(dialect, compound, start_idx),
    }
}

/// Build a compound filter (AND, OR, NOT).
pub(super) fn build_compound_filter_impl<D: Dialect>(
    dialect: &D,
    compound: &CompoundFilter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let mut idx = start_idx;
    let mut all_params = Vec::new();
    let mut conditions = Vec::new();

    for filter_expr in &compound.filters {
        let (condition, params, new_idx) = build_filter_expr_impl(dialect, filter_expr, idx);
        conditions.push(condition);
        all_params.extend(params);
        idx = new_idx;
    }

    let sql = match compound.op {
        LogicalOp::And | LogicalOp::Or if conditions.is_empty() => {
            // Empty AND is a tautology, empty OR matches nothing
            if compound.op == LogicalOp::And {
                "1=1".to_string()
            } else {
                "1=0".to_string()
            }
        },
        LogicalOp::And => join_conditions(conditions, " AND "),
        LogicalOp::Or => join_conditions(conditions, " OR "),
        LogicalOp::Not => {
            let inner = conditions.into_iter().next().unwrap_or_default();
            format!("NOT ({inner})")
        },
    };

    (sql, all_params, idx)
}

fn join_conditions(conditions: Vec<String>, sep: &str) -> String {
    if conditions.len() == 1 {
        conditions.into_iter().next().unwrap_or_default()
    } else {
        format!("({})", conditions.join(sep))
    }
}

/// Build a single filter condition.
pub(super) fn build_condition_impl<D: Dialect>(
    dialect: &D,
    filter: &Filter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let field = &filter.field;
    let idx = start_idx;

    match (&filter.op, &filter.value) {
        // NULL handling
        (Operator::Eq, Value::Null) => (format!("{field} IS NULL"), vec![], idx),
        (Operator::Ne, Value::Null) => (format!("{field} IS NOT NULL"), vec![], idx),

        (Operator::IContains, Value::String(term)) => {
            let sql = dialect.icontains_clause(field, idx);
            (sql, vec![Value::String(escape_like(term))], idx + 1)
        },
        (Operator::IContains, other) => (
            format!("1=0 /* ICONTAINS requires a string, got {other:?} */"),
            vec![],
            idx,
        ),

        // BETWEEN operator - takes an array with exactly 2 values
        (Operator::Between, Value::Array(values)) => {
            if values.len() != 2 {
                return (
                    format!("1=0 /* BETWEEN requires 2 values, got {} */", values.len()),
                    vec![],
                    idx,
                );
            }
            let sql = format!(
                "{} BETWEEN {} AND {}",
                field,
                dialect.param(idx),
                dialect.param(idx + 1)
            );
            (sql, values.clone(), idx + 2)
        },
        (Operator::Between, _) => (
            "1=0 /* BETWEEN requires an array */".to_string(),
            vec![],
            idx,
        ),

        // Standard comparisons
        (op, value) => {
            let op_str = match op {
                Operator::Ne => "!=",
                Operator::Gt => ">",
                Operator::Gte => ">=",
                Operator::Lt => "<",
                Operator::Lte => "<=",
                _ => "=",
            };
            let sql = format!("{} {} {}", field, op_str, dialect.param(idx));
            (sql, vec![value.clone()], idx + 1)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::{and, or, simple};
    use crate::dialect::{Postgres, Sqlite};

    #[test]
    fn test_eq_null_postgres() {
        let pg = Postgres;
        let filter = Filter {
            field: "category_id".to_string(),
            op: Operator::Eq,
            value: Value::Null,
        };
        let (sql, params, idx) = build_condition_impl(&pg, &filter, 1);
        assert_eq!(sql, "category_id IS NULL");
        assert!(params.is_empty());
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_eq_string_sqlite() {
        let filter = Filter {
            field: "owner_id".to_string(),
            op: Operator::Eq,
            value: Value::String("u1".to_string()),
        };
        let (sql, params, idx) = build_condition_impl(&Sqlite, &filter, 3);
        assert_eq!(sql, "owner_id = ?3");
        assert_eq!(params, vec![Value::String("u1".to_string())]);
        assert_eq!(idx, 4);
    }

    #[test]
    fn test_icontains_escapes_and_lowercases_param() {
        let filter = Filter {
            field: "description".to_string(),
            op: Operator::IContains,
            value: Value::String("Rent_100%".to_string()),
        };
        let (sql, params, idx) = build_condition_impl(&Postgres, &filter, 1);
        assert!(sql.starts_with("description ILIKE"));
        assert_eq!(params, vec![Value::String(r"rent\_100\%".to_string())]);
        assert_eq!(idx, 2);
    }

    #[test]
    fn test_icontains_non_string_matches_nothing() {
        let filter = Filter {
            field: "description".to_string(),
            op: Operator::IContains,
            value: Value::Int(3),
        };
        let (sql, params, idx) = build_condition_impl(&Sqlite, &filter, 1);
        assert!(sql.starts_with("1=0"));
        assert!(params.is_empty());
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_between_postgres() {
        let filter = Filter {
            field: "amount".to_string(),
            op: Operator::Between,
            value: Value::Array(vec![Value::Int(800), Value::Int(1200)]),
        };
        let (sql, params, idx) = build_condition_impl(&Postgres, &filter, 1);
        assert_eq!(sql, "amount BETWEEN $1 AND $2");
        assert_eq!(params, vec![Value::Int(800), Value::Int(1200)]);
        assert_eq!(idx, 3);
    }

    #[test]
    fn test_between_wrong_arity_fallback() {
        let filter = Filter {
            field: "amount".to_string(),
            op: Operator::Between,
            value: Value::Array(vec![Value::Int(1)]),
        };
        let (sql, params, idx) = build_condition_impl(&Sqlite, &filter, 1);
        assert!(sql.starts_with("1=0"));
        assert!(params.is_empty());
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_compound_param_numbering() {
        let expr = and(vec![
            simple("owner_id", Operator::Eq, Value::String("u1".into())),
            or(vec![
                simple("created_at", Operator::Lt, Value::String("t".into())),
                and(vec![
                    simple("created_at", Operator::Eq, Value::String("t".into())),
                    simple("id", Operator::Lt, Value::String("x".into())),
                ]),
            ]),
        ]);
        let (sql, params, idx) = build_filter_expr_impl(&Sqlite, &expr, 1);
        assert_eq!(
            sql,
            "(owner_id = ?1 AND (created_at < ?2 OR (created_at = ?3 AND id < ?4)))"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(idx, 5);
    }

    #[test]
    fn test_not_compound() {
        let expr = crate::builder::types::not(simple("amount", Operator::Gt, Value::Int(10)));
        let (sql, _, _) = build_filter_expr_impl(&Postgres, &expr, 1);
        assert_eq!(sql, "NOT (amount > $1)");
    }

    #[test]
    fn test_empty_compounds() {
        let (sql, params, _) = build_filter_expr_impl(&Postgres, &and(vec![]), 1);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
        let (sql, _, _) = build_filter_expr_impl(&Postgres, &or(vec![]), 1);
        assert_eq!(sql, "1=0");
    }
}
