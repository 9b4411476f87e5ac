//! Keyset pagination condition generation.

use crate::builder::{CompoundFilter, Filter, FilterExpr, Operator, SortDir, SortField, Value};

/// Keyset pagination condition.
///
/// Expands a `(col1, col2) > (v1, v2)` style bound into plain comparisons so
/// every backend (and the in-memory evaluator) can run it, with each column
/// compared in its own sort direction.
#[derive(Debug, Clone, PartialEq)]
pub struct KeysetCondition {
    /// The sort fields and their directions.
    pub sort_fields: Vec<SortField>,
    /// The cursor values for each field.
    pub cursor_values: Vec<Value>,
}

impl KeysetCondition {
    /// Bound selecting rows that come after the given position.
    ///
    /// Returns `None` when `bounds` is empty.
    #[must_use]
    pub fn after(bounds: Vec<(SortField, Value)>) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        let (sort_fields, cursor_values) = bounds.into_iter().unzip();
        Some(Self {
            sort_fields,
            cursor_values,
        })
    }

    /// Convert to a filter expression for the query builder.
    ///
    /// For a single field, generates: `field > $1` (or `<` for DESC)
    ///
    /// For multiple fields, generates compound OR conditions:
    /// `(a, b) > (1, 2)` becomes: `(a > 1) OR (a = 1 AND b > 2)`
    ///
    /// For 3+ fields: `(a > 1) OR (a = 1 AND b > 2) OR (a = 1 AND b = 2 AND c > 3)`
    ///
    /// See: <https://use-the-index-luke.com/no-offset>
    #[must_use]
    pub fn to_filter_expr(&self) -> FilterExpr {
        let pairs: Vec<(&SortField, &Value)> =
            self.sort_fields.iter().zip(&self.cursor_values).collect();

        let mut or_conditions: Vec<FilterExpr> = Vec::with_capacity(pairs.len());

        for (i, (sort, value)) in pairs.iter().enumerate() {
            // Equality on the preceding fields, then a strict comparison on this one
            let mut and_conditions: Vec<FilterExpr> = pairs
                .iter()
                .take(i)
                .map(|(prev, prev_value)| {
                    FilterExpr::Simple(Filter {
                        field: prev.field.clone(),
                        op: Operator::Eq,
                        value: (*prev_value).clone(),
                    })
                })
                .collect();

            and_conditions.push(FilterExpr::Simple(Filter {
                field: sort.field.clone(),
                op: past(sort.dir),
                value: (*value).clone(),
            }));

            or_conditions.push(collapse(and_conditions, CompoundFilter::and));
        }

        collapse(or_conditions, CompoundFilter::or)
    }
}

/// Comparison selecting rows past a value in `dir` order.
const fn past(dir: SortDir) -> Operator {
    match dir {
        SortDir::Asc => Operator::Gt,
        SortDir::Desc => Operator::Lt,
    }
}

fn collapse(mut filters: Vec<FilterExpr>, combine: fn(Vec<FilterExpr>) -> CompoundFilter) -> FilterExpr {
    if filters.len() == 1 {
        if let Some(only) = filters.pop() {
            return only;
        }
    }
    FilterExpr::Compound(combine(filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LogicalOp;

    fn desc(field: &str) -> SortField {
        SortField::new(field, SortDir::Desc)
    }

    fn asc(field: &str) -> SortField {
        SortField::new(field, SortDir::Asc)
    }

    #[test]
    fn test_keyset_condition_asc() {
        let condition = KeysetCondition::after(vec![(asc("amount"), Value::Int(100))]).unwrap();

        let FilterExpr::Simple(f) = condition.to_filter_expr() else {
            panic!("Expected simple filter");
        };
        assert_eq!(f.field, "amount");
        assert_eq!(f.op, Operator::Gt);
    }

    #[test]
    fn test_keyset_condition_desc() {
        let condition = KeysetCondition::after(vec![(
            desc("created_at"),
            Value::String("2024-01-01".into()),
        )])
        .unwrap();

        let FilterExpr::Simple(f) = condition.to_filter_expr() else {
            panic!("Expected simple filter");
        };
        assert_eq!(f.op, Operator::Lt);
    }

    #[test]
    fn test_keyset_value_and_id_desc() {
        // (created_at, id) < ('t', 'x') for newest-first ordering
        let condition = KeysetCondition::after(vec![
            (desc("created_at"), Value::String("t".into())),
            (desc("id"), Value::String("x".into())),
        ])
        .unwrap();

        let FilterExpr::Compound(compound) = condition.to_filter_expr() else {
            panic!("Expected compound OR filter");
        };
        assert_eq!(compound.op, LogicalOp::Or);
        assert_eq!(compound.filters.len(), 2);

        let FilterExpr::Simple(first) = &compound.filters[0] else {
            panic!("Expected simple filter for first condition");
        };
        assert_eq!(first.field, "created_at");
        assert_eq!(first.op, Operator::Lt);

        let FilterExpr::Compound(tie) = &compound.filters[1] else {
            panic!("Expected compound AND filter for second condition");
        };
        assert_eq!(tie.op, LogicalOp::And);
        assert_eq!(
            tie.filters,
            vec![
                FilterExpr::Simple(Filter {
                    field: "created_at".into(),
                    op: Operator::Eq,
                    value: Value::String("t".into()),
                }),
                FilterExpr::Simple(Filter {
                    field: "id".into(),
                    op: Operator::Lt,
                    value: Value::String("x".into()),
                }),
            ]
        );
    }

    #[test]
    fn test_keyset_condition_three_fields() {
        let condition = KeysetCondition::after(vec![
            (asc("a"), Value::Int(1)),
            (asc("b"), Value::Int(2)),
            (asc("c"), Value::Int(3)),
        ])
        .unwrap();

        let FilterExpr::Compound(compound) = condition.to_filter_expr() else {
            panic!("Expected compound filter");
        };
        assert_eq!(compound.filters.len(), 3);
        let FilterExpr::Compound(last) = &compound.filters[2] else {
            panic!("Expected compound filter");
        };
        assert_eq!(last.filters.len(), 3);
    }

    #[test]
    fn test_keyset_with_empty_bounds() {
        assert!(KeysetCondition::after(vec![]).is_none());
    }
}
