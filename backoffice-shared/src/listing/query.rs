/// SQL side of the list contract
///
/// A [`ListSpec`] describes one listable table: which columns are selected,
/// which are searched, which may be sorted, the default ordering and the row
/// scope (soft-delete filter). Column names in the generated SQL always come
/// from the `ListSpec` static whitelists, never from the request; request values
/// are bound as parameters.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::page::Page;
use super::params::{ListParams, SortDirection, SortSpec};
use super::ListError;

/// Static description of a listable table
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    /// Table name
    pub table: &'static str,

    /// Select list
    pub columns: &'static str,

    /// SQL expressions matched with `ILIKE`, OR-combined
    pub searchable: &'static [&'static str],

    /// Column identifiers accepted in `sort`
    pub sortable: &'static [&'static str],

    /// Ordering used when the request carries no sort
    pub default_order: &'static [(&'static str, SortDirection)],

    /// Unique column appended last so page boundaries are stable
    pub tiebreaker: &'static str,

    /// Row filter applied to every query, e.g. `deleted_at IS NULL`
    pub scope: &'static str,
}

/// Builds a `%term%` pattern where `\`, `%` and `_` match literally
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl ListSpec {
    /// Rejects sort entries naming a column outside the whitelist
    pub fn validate_sort(&self, sort: &[SortSpec]) -> Result<(), ListError> {
        for spec in sort {
            if !self.sortable.contains(&spec.id.as_str()) {
                return Err(ListError::UnsortableColumn(spec.id.clone()));
            }
        }
        Ok(())
    }

    /// Renders the ORDER BY list (without the keyword)
    pub fn order_clause(&self, sort: &[SortSpec]) -> Result<String, ListError> {
        let mut parts = Vec::new();

        if sort.is_empty() {
            for (column, direction) in self.default_order {
                parts.push(format!("{} {}", column, direction.as_sql()));
            }
        } else {
            for spec in sort {
                let column = self
                    .sortable
                    .iter()
                    .find(|c| **c == spec.id)
                    .ok_or_else(|| ListError::UnsortableColumn(spec.id.clone()))?;
                parts.push(format!("{} {}", column, spec.direction().as_sql()));
            }
        }

        let already_ordered = if sort.is_empty() {
            self.default_order.iter().any(|(c, _)| *c == self.tiebreaker)
        } else {
            sort.iter().any(|s| s.id == self.tiebreaker)
        };
        if !already_ordered {
            parts.push(format!("{} ASC", self.tiebreaker));
        }

        Ok(parts.join(", "))
    }

    fn push_search<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, search: &str) {
        let term = search.trim();
        if term.is_empty() || self.searchable.is_empty() {
            return;
        }

        let pattern = like_pattern(term);
        qb.push(" AND (");
        let mut separated = qb.separated(" OR ");
        for expr in self.searchable {
            separated.push(format!("{} ILIKE ", expr));
            separated.push_bind_unseparated(pattern.clone());
        }
        separated.push_unseparated(")");
    }

    /// Counts rows in scope that match `search`
    pub async fn count(&self, pool: &PgPool, search: &str) -> Result<i64, ListError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.table, self.scope
        ));
        self.push_search(&mut qb, search);

        let (count,) = qb.build_query_as::<(i64,)>().fetch_one(pool).await?;
        Ok(count)
    }

    /// Runs a list request and returns the page envelope
    ///
    /// # Errors
    ///
    /// - [`ListError::UnsortableColumn`] before touching the database when a
    ///   sort entry is not whitelisted
    /// - [`ListError::Database`] when either query fails
    pub async fn fetch_page<R>(&self, pool: &PgPool, params: &ListParams) -> Result<Page<R>, ListError>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.validate_sort(&params.sort)?;
        let order = self.order_clause(&params.sort)?;

        let total = self.count(pool, &params.search).await?;

        // Past the last row: nothing to fetch, the envelope still echoes the page
        if params.offset() >= total {
            return Ok(Page::new(Vec::new(), total, params));
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE {}",
            self.columns, self.table, self.scope
        ));
        self.push_search(&mut qb, &params.search);
        qb.push(" ORDER BY ");
        qb.push(order);
        qb.push(" LIMIT ");
        qb.push_bind(params.page_size);
        qb.push(" OFFSET ");
        qb.push_bind(params.offset());

        let items = qb.build_query_as::<R>().fetch_all(pool).await?;

        tracing::debug!(
            table = self.table,
            total,
            page = params.page,
            returned = items.len(),
            "Fetched list page"
        );

        Ok(Page::new(items, total, params))
    }

    /// Renders the full page query, for logging and tests
    pub fn page_sql(&self, params: &ListParams) -> Result<String, ListError> {
        self.validate_sort(&params.sort)?;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE {}",
            self.columns, self.table, self.scope
        ));
        self.push_search(&mut qb, &params.search);
        qb.push(" ORDER BY ");
        qb.push(self.order_clause(&params.sort)?);
        qb.push(" LIMIT ");
        qb.push_bind(params.page_size);
        qb.push(" OFFSET ");
        qb.push_bind(params.offset());
        Ok(qb.sql().to_string())
    }
}
