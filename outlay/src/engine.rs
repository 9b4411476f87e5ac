//! The query engine: validates requests, reads through the injected stores
//! and shapes pages.

use outlay_sql::{Operator, SortDir, SortField, Value, simple};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{CATEGORY_NAME, Category, Expense};
use crate::offset::OffsetPage;
use crate::page::Page;
use crate::search::{BasicPagination, SearchCriteria, build_category_query, build_expense_query};
use crate::store::{ReadRequest, ReadStore};

/// Read-only expense and category queries over pluggable storage.
///
/// Holds no mutable state; share it across threads freely.
///
/// ```
/// use chrono::Utc;
/// use outlay::{
///     CancelToken, Category, EngineConfig, Expense, ExpenseEngine, MemoryStore, NewExpense,
///     SearchCriteria,
/// };
///
/// let expenses = MemoryStore::new();
/// let input = NewExpense {
///     category_id: "groceries".into(),
///     amount: 1250,
///     currency: "EUR".into(),
///     description: Some("Weekly shop".into()),
///     date: "2024-03-01".into(),
/// };
/// expenses.insert(Expense::create("u1", input, Utc::now())?)?;
///
/// let categories = MemoryStore::<Category>::new();
/// let engine = ExpenseEngine::new(expenses, categories, EngineConfig::default());
/// let page = engine.search_expenses("u1", &SearchCriteria::default(), None, &CancelToken::new())?;
/// assert_eq!(page.total_count, 1);
/// # Ok::<(), outlay::Error>(())
/// ```
#[derive(Debug)]
pub struct ExpenseEngine<E, C> {
    expenses: E,
    categories: C,
    config: EngineConfig,
}

impl<E, C> ExpenseEngine<E, C>
where
    E: ReadStore<Expense>,
    C: ReadStore<Category>,
{
    /// Create an engine over the given stores.
    pub const fn new(expenses: E, categories: C, config: EngineConfig) -> Self {
        Self {
            expenses,
            categories,
            config,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a cursor-paginated expense search for `owner`.
    ///
    /// `category` restricts results to one category id. Invalid input fails
    /// before storage is read; an aborted token fails the whole call.
    #[tracing::instrument(
        skip(self, criteria, cancel),
        fields(order = %criteria.order, first = ?criteria.first, cursor = criteria.after.is_some())
    )]
    pub fn search_expenses(
        &self,
        owner: &str,
        criteria: &SearchCriteria,
        category: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Page<Expense>> {
        let query = build_expense_query(owner, criteria, category, &self.config)
            .inspect_err(|e| warn!(error = %e, "rejected expense search"))?;
        let cancel = self.effective(cancel);

        cancel.check()?;
        let total_count = self.expenses.count(query.count_filter(), &cancel)?;
        cancel.check()?;
        let rows = self.expenses.query(&query.page_request(), &cancel)?;
        cancel.check()?;

        debug!(total_count, fetched = rows.len(), "expense page read");
        let key = query.order().key;
        Ok(Page::assemble(
            rows,
            total_count,
            query.first(),
            query.has_cursor(),
            |expense| expense.cursor(key),
        ))
    }

    /// List `owner`'s categories by name, one numbered page at a time.
    #[tracing::instrument(skip(self, cancel), fields(page = pagination.page, page_size = pagination.page_size))]
    pub fn list_categories(
        &self,
        owner: &str,
        pagination: BasicPagination,
        search: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<OffsetPage<Category>> {
        let query = build_category_query(owner, pagination, search, &self.config)
            .inspect_err(|e| warn!(error = %e, "rejected category listing"))?;
        let cancel = self.effective(cancel);

        cancel.check()?;
        let total_count = self.categories.count(query.count_filter(), &cancel)?;
        cancel.check()?;
        let results = self.categories.query(&query.page_request(), &cancel)?;
        cancel.check()?;

        debug!(total_count, returned = results.len(), "category page read");
        OffsetPage::new(results, total_count, pagination.page, pagination.page_size)
    }

    /// Every expense of `owner`, newest date first.
    #[tracing::instrument(skip(self, cancel))]
    pub fn all_expenses(&self, owner: &str, cancel: &CancelToken) -> Result<Vec<Expense>> {
        let request = ReadRequest::new(owner_scope(owner)).sort(vec![
            SortField::new("date", SortDir::Desc),
            SortField::new("created_at", SortDir::Desc),
            SortField::new("id", SortDir::Desc),
        ]);
        let cancel = self.effective(cancel);

        cancel.check()?;
        let rows = self.expenses.query(&request, &cancel)?;
        cancel.check()?;
        Ok(rows)
    }

    /// Find one of `owner`'s categories by id or by name.
    ///
    /// The term is lower-cased first. A term that parses as a UUID is
    /// looked up by id; anything else is matched against the name. Terms
    /// outside the category name alphabet are rejected.
    #[tracing::instrument(skip(self, cancel))]
    pub fn resolve_category(
        &self,
        owner: &str,
        term: &str,
        cancel: &CancelToken,
    ) -> Result<Option<Category>> {
        let term = term.trim().to_lowercase();
        if !CATEGORY_NAME.is_match(&term) {
            warn!("rejected category lookup");
            return Err(Error::InvalidSearch(
                "category term can not have special characters".into(),
            ));
        }
        let column = if Uuid::parse_str(&term).is_ok() { "id" } else { "name" };
        let lookup = simple(column, Operator::Eq, Value::String(term));
        let request = ReadRequest::new(owner_scope(owner).and_also(lookup)).limit(1);
        let cancel = self.effective(cancel);

        cancel.check()?;
        let found = self.categories.query(&request, &cancel)?.into_iter().next();
        cancel.check()?;
        Ok(found)
    }

    fn effective(&self, cancel: &CancelToken) -> CancelToken {
        cancel.clone().or_timeout(self.config.query_timeout())
    }
}

fn owner_scope(owner: &str) -> outlay_sql::FilterExpr {
    simple("owner_id", Operator::Eq, Value::String(owner.to_string()))
}
