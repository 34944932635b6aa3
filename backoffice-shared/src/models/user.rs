/// User model and database operations
///
/// This module provides the User model and CRUD operations for back-office
/// accounts. Users are soft-deleted: a row with `deleted_at` set is invisible
/// to every query in this module, while its unique `user_code`, `username` and
/// `email` stay reserved.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_code VARCHAR(50) NOT NULL UNIQUE,
///     username VARCHAR(50) NOT NULL UNIQUE,
///     first_name VARCHAR(50) NOT NULL,
///     last_name VARCHAR(50) NOT NULL,
///     avatar VARCHAR(512),
///     phone VARCHAR(50),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     gender user_gender NOT NULL,
///     status user_status NOT NULL DEFAULT 'pending',
///     address, city, state, zip, country,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use backoffice_shared::models::user::{CreateUser, Gender, User};
/// use backoffice_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     user_code: "EMP-001".to_string(),
///     username: "jdoe".to_string(),
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     email: "john@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     gender: Gender::Male,
///     avatar: Some(Gender::Male.default_avatar()),
///     phone: None,
///     address: None,
///     city: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::ParseEnumError;
use crate::listing::{ListError, ListParams, ListSpec, Page, SortDirection};
use crate::table::TableRow;

const USER_COLUMNS: &str = "id, user_code, username, first_name, last_name, avatar, phone, email, \
     password_hash, gender, status, address, city, state, zip, country, created_at, updated_at";

/// List definition for the users table
pub const USER_LIST: ListSpec = ListSpec {
    table: "users",
    columns: USER_COLUMNS,
    searchable: &["username", "email", "first_name", "last_name", "status::text"],
    sortable: &[
        "user_code",
        "username",
        "first_name",
        "last_name",
        "email",
        "phone",
        "gender",
        "status",
        "city",
        "created_at",
        "updated_at",
    ],
    default_order: &[("created_at", SortDirection::Desc)],
    tiebreaker: "id",
    scope: "deleted_at IS NULL",
};

/// Gender, stored as the `user_gender` Postgres enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Placeholder avatar path used when no file was uploaded
    pub fn default_avatar(&self) -> String {
        format!("avatars/default/{}.png", self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(ParseEnumError::new("gender", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status, stored as the `user_status` Postgres enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    #[default]
    Pending,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }
}

impl FromStr for UserStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "pending" => Ok(UserStatus::Pending),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model representing a back-office account
///
/// Passwords are stored as Argon2id hashes and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Business-facing identifier, unique
    pub user_code: String,

    /// Login handle, unique
    pub username: String,

    pub first_name: String,
    pub last_name: String,

    /// Storage path of the avatar image, e.g. `avatars/1728497996-1a2b3c4d.png`
    pub avatar: Option<String>,

    pub phone: Option<String>,

    /// Email address, unique
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub gender: Gender,
    pub status: UserStatus,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TableRow for User {
    fn row_id(&self) -> Uuid {
        self.id
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_code: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub gender: Gender,

    /// Storage path of the avatar, or the gender placeholder
    pub avatar: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated; nullable
/// columns use `Some(None)` to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub user_code: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub zip: Option<Option<String>>,
    pub country: Option<Option<String>>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.user_code.is_none()
            && self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.gender.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.country.is_none()
    }
}

/// Returns true when `caller` is among the deletion `targets`
///
/// The authenticated user may never delete itself, alone or as part of a
/// bulk operation.
pub fn targets_self(caller: Uuid, targets: &[Uuid]) -> bool {
    targets.contains(&caller)
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - User creation data
    ///
    /// # Returns
    ///
    /// The newly created user with generated ID and timestamps. Status starts
    /// as `pending`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `user_code`, `username` or `email` already exists (unique constraint
    ///   violation, including soft-deleted rows)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (user_code, username, first_name, last_name, email,
                               password_hash, gender, avatar, phone, address, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(data.user_code)
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.gender)
        .bind(data.avatar)
        .bind(data.phone)
        .bind(data.address)
        .bind(data.city)
        .fetch_one(pool)
        .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Created user");

        Ok(user)
    }

    /// Finds a live user by ID
    ///
    /// # Returns
    ///
    /// The user if found and not soft-deleted, None otherwise
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use backoffice_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// if let Some(user) = User::find_by_id(&pool, user_id).await? {
    ///     println!("Found user: {}", user.email);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a live user by email address (used for login)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is always refreshed.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist or is deleted
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - New `user_code`, `username` or `email` belongs to another user
    /// - Database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use backoffice_shared::models::user::{User, UpdateUser};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// let update = UpdateUser {
    ///     first_name: Some("Jane".to_string()),
    ///     city: Some(None),
    ///     ..Default::default()
    /// };
    ///
    /// if let Some(user) = User::update(&pool, user_id, update).await? {
    ///     println!("Updated user: {}", user.username);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");

        macro_rules! set {
            ($column:literal, $value:expr) => {
                if let Some(value) = $value {
                    qb.push(concat!(", ", $column, " = "));
                    qb.push_bind(value);
                }
            };
        }

        set!("user_code", data.user_code);
        set!("username", data.username);
        set!("first_name", data.first_name);
        set!("last_name", data.last_name);
        set!("email", data.email);
        set!("password_hash", data.password_hash);
        set!("gender", data.gender);
        set!("phone", data.phone);
        set!("address", data.address);
        set!("city", data.city);
        set!("state", data.state);
        set!("zip", data.zip);
        set!("country", data.country);

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND deleted_at IS NULL RETURNING ");
        qb.push(USER_COLUMNS);

        let user = qb.build_query_as::<User>().fetch_optional(pool).await?;

        Ok(user)
    }

    /// Sets the account status
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: UserStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Points the avatar at a new storage path
    pub async fn update_avatar(
        pool: &PgPool,
        id: Uuid,
        avatar: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET avatar = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(avatar)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Soft-deletes a user by ID
    ///
    /// # Returns
    ///
    /// True if a live user was deleted, false if none matched
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes every live user in `ids`
    ///
    /// The self-delete rule is checked by the caller with [`targets_self`]
    /// before this runs.
    ///
    /// # Returns
    ///
    /// Number of users deleted
    pub async fn soft_delete_many(pool: &PgPool, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = ANY($1) AND deleted_at IS NULL
            "#,
        )
        .bind(ids)
        .execute(pool)
        .await?;

        tracing::info!(requested = ids.len(), deleted = result.rows_affected(), "Bulk deleted users");

        Ok(result.rows_affected())
    }

    /// Counts live users, ignoring any search filter
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use backoffice_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let total = User::count(&pool).await?;
    /// println!("Total users: {}", total);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Lists live users according to `params`
    ///
    /// When `pin` names a user present on the returned page, that user is moved
    /// to the first row regardless of sort order. Rows on other pages are not
    /// affected.
    ///
    /// # Errors
    ///
    /// - [`ListError::UnsortableColumn`] for a sort column outside the whitelist
    /// - [`ListError::Database`] when the query fails
    pub async fn list(
        pool: &PgPool,
        params: &ListParams,
        pin: Option<Uuid>,
    ) -> Result<Page<Self>, ListError> {
        let mut page = USER_LIST.fetch_page::<User>(pool, params).await?;

        if let Some(pinned) = pin {
            page.pin_first(|user| user.id == pinned);
        }

        Ok(page)
    }
}
