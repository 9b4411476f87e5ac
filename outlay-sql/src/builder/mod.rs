//! Predicate model, SQL rendering and in-process evaluation.

mod eval;
mod filter;
mod select;
mod types;

pub use eval::{Row, compare_rows, compare_values};
pub use select::QueryBuilder;
pub use types::{
    CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, QueryResult, SortDir, SortField,
    Value, and, not, or, simple,
};
