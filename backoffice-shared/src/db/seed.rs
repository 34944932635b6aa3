/// Startup seeding
///
/// Every start makes sure the single store row exists, and, when admin
/// credentials are configured, that an account exists to log in with. Both
/// steps are idempotent.

use sqlx::PgPool;
use tracing::info;

use crate::auth::password::{hash_password, PasswordError};
use crate::models::store::Store;
use crate::models::user::{CreateUser, Gender, User, UserStatus};

/// Errors raised while seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Returns the current store, inserting the default one if none exists
pub async fn seed_default_store(pool: &PgPool) -> Result<Store, SeedError> {
    if let Some(store) = Store::current(pool).await? {
        return Ok(store);
    }

    info!("No store found, seeding default store");
    Ok(Store::create_default(pool).await?)
}

/// Account data for the seeded administrator
pub fn admin_account(email: &str, password_hash: String) -> CreateUser {
    let username = email.split('@').next().unwrap_or(email).to_string();

    CreateUser {
        user_code: "ADMIN-0001".to_string(),
        username,
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash,
        gender: Gender::Male,
        avatar: Some(Gender::Male.default_avatar()),
        phone: None,
        address: None,
        city: None,
    }
}

/// Creates an active administrator unless a live user already has `email`
///
/// # Returns
///
/// The created user, or `None` when the account already existed
pub async fn seed_admin(pool: &PgPool, email: &str, password: &str) -> Result<Option<User>, SeedError> {
    if User::find_by_email(pool, email).await?.is_some() {
        return Ok(None);
    }

    let user = User::create(pool, admin_account(email, hash_password(password)?)).await?;
    let user = User::update_status(pool, user.id, UserStatus::Active)
        .await?
        .unwrap_or(user);

    info!(user_id = %user.id, email = %user.email, "Seeded administrator");
    Ok(Some(user))
}
