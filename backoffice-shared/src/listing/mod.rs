/// Server-driven list contract
///
/// A list endpoint accepts [`ListParams`] (page, page size, search term and an
/// ordered sort list), filters with a case-insensitive substring match across a
/// fixed set of columns, sorts, paginates and answers with a [`Page`] envelope
/// that echoes the request back.
///
/// # Modules
///
/// - [`params`]: Request side (`ListParams`, `SortSpec`, raw query-string form)
/// - [`page`]: Response envelope with `total`/`lastPage` bookkeeping
/// - [`query`]: `ListSpec`, the per-table description that builds the SQL
///
/// # Example
///
/// ```no_run
/// use backoffice_shared::listing::{ListParams, SortSpec};
/// use backoffice_shared::models::user::User;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let params = ListParams {
///     page: 3,
///     page_size: 10,
///     search: "smith".to_string(),
///     sort: vec![SortSpec::desc("created_at")],
/// };
///
/// let page = User::list(&pool, &params, None).await?;
/// println!("{} of {} users (last page {})", page.items.len(), page.total, page.last_page);
/// # Ok(())
/// # }
/// ```

pub mod page;
pub mod params;
pub mod query;

pub use page::Page;
pub use params::{ListParams, ListQuery, SortDirection, SortSpec, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use query::{like_pattern, ListSpec};

/// Errors produced while interpreting or running a list request
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// The `sort` parameter was not a JSON list of `{id, desc}` objects
    #[error("Malformed sort parameter: {0}")]
    MalformedSort(String),

    /// A sort entry named a column outside the sortable whitelist
    #[error("Column '{0}' cannot be sorted")]
    UnsortableColumn(String),

    /// Query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
