/// Database models for the back-office
///
/// This module contains the database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Back-office user accounts (soft-deletable, listable)
/// - `store`: The singleton store settings row with its JSON-array columns
///
/// # Example
///
/// ```no_run
/// use backoffice_shared::models::user::User;
/// use backoffice_shared::models::store::Store;
/// use backoffice_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let active = User::count(&pool).await?;
/// let store = Store::current(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod store;
pub mod user;

/// A string did not name a known variant of a model enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
