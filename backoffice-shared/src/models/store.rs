/// Store settings model and database operations
///
/// There is exactly one logical store: the first non-deleted row of `stores`
/// ordered by creation. GST numbers and social media links live on that row as
/// JSONB arrays and are edited through append/remove operations that lock the
/// row for the whole read-modify-write.
///
/// # JSON columns
///
/// Clients always see arrays. Decoding accepts what older rows may contain:
///
/// - SQL `NULL` or JSON `null` (read as an empty array)
/// - a JSON string holding an encoded array (double-encoded rows)
/// - a JSON object mapping platform to link (social media only)
/// - elements using the alternate field names (`value`, `name`, `link`)
///
/// Elements that still fail to decode are skipped with a warning. They are
/// hidden from clients but stay stored: edits work on the raw elements, so an
/// append or remove never drops them.
///
/// # Example
///
/// ```no_run
/// use backoffice_shared::models::store::{GstNumber, Store};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let numbers = Store::add_gst_numbers(&pool, vec![GstNumber {
///     name: "GSTIN".to_string(),
///     number: "22AAAAA0000A1Z5".to_string(),
///     show_in_invoice: true,
/// }])
/// .await?;
///
/// Store::remove_gst_number(&pool, numbers.len() - 1).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const STORE_COLUMNS: &str = "id, name, slug, description, image, status, type, address, city, \
     country, zip, phone, mobile, email, website, social_media, time_zone, currency, \
     currency_symbol, currency_placement, thousand_separator, decimal_separator, date_format, \
     time_format, no_of_decimals, gsts_numbers, created_at, updated_at";

const CURRENT_STORE: &str =
    "SELECT id FROM stores WHERE deleted_at IS NULL ORDER BY created_at ASC, id ASC LIMIT 1";

/// Image path used until a store image is uploaded
pub const DEFAULT_STORE_IMAGE: &str = "default.jpg";

/// Errors from store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No live store row exists
    #[error("Store not found")]
    NotFound,

    /// Array edit addressed an element that does not exist
    #[error("No entry at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A record could not be encoded as JSON
    #[error("JSON encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One GST registration: `{ name, number, showInInvoice }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstNumber {
    pub name: String,

    #[serde(alias = "value")]
    pub number: String,

    #[serde(default, alias = "show_in_invoice")]
    pub show_in_invoice: bool,
}

/// One social profile: `{ platform, url }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMediaLink {
    #[serde(alias = "name")]
    pub platform: String,

    #[serde(alias = "link")]
    pub url: String,
}

/// The store settings as clients see them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,

    /// Storage path of the store image
    pub image: String,

    /// `active` or `inactive`
    pub status: String,

    #[serde(rename = "type")]
    pub store_type: String,

    pub address: String,
    pub city: String,
    pub country: String,
    pub zip: String,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub email: String,
    pub website: Option<String>,
    pub social_media: Vec<SocialMediaLink>,
    pub time_zone: Option<String>,
    pub currency: String,
    pub currency_symbol: String,

    /// `before` or `after` the amount
    pub currency_placement: String,

    pub thousand_separator: String,
    pub decimal_separator: String,
    pub date_format: String,
    pub time_format: String,
    pub no_of_decimals: i32,
    pub gsts_numbers: Vec<GstNumber>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row, JSON columns undecoded
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    image: String,
    status: String,
    #[sqlx(rename = "type")]
    store_type: String,
    address: String,
    city: String,
    country: String,
    zip: String,
    phone: Option<String>,
    mobile: Option<String>,
    email: String,
    website: Option<String>,
    social_media: Option<Json<Value>>,
    time_zone: Option<String>,
    currency: String,
    currency_symbol: String,
    currency_placement: String,
    thousand_separator: String,
    decimal_separator: String,
    date_format: String,
    time_format: String,
    no_of_decimals: i32,
    gsts_numbers: Option<Json<Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            image: row.image,
            status: row.status,
            store_type: row.store_type,
            address: row.address,
            city: row.city,
            country: row.country,
            zip: row.zip,
            phone: row.phone,
            mobile: row.mobile,
            email: row.email,
            website: row.website,
            social_media: decode_json_array(
                row.social_media.as_ref().map(|j| &j.0),
                JsonColumn::SocialMedia.as_str(),
            ),
            time_zone: row.time_zone,
            currency: row.currency,
            currency_symbol: row.currency_symbol,
            currency_placement: row.currency_placement,
            thousand_separator: row.thousand_separator,
            decimal_separator: row.decimal_separator,
            date_format: row.date_format,
            time_format: row.time_format,
            no_of_decimals: row.no_of_decimals,
            gsts_numbers: decode_json_array(
                row.gsts_numbers.as_ref().map(|j| &j.0),
                JsonColumn::GstsNumbers.as_str(),
            ),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full replacement of the profile and locale fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreProfile {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub status: String,
    pub store_type: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zip: String,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub email: String,
    pub website: Option<String>,
    pub time_zone: Option<String>,
    pub currency: String,
    pub currency_symbol: String,
    pub currency_placement: String,
    pub thousand_separator: String,
    pub decimal_separator: String,
    pub date_format: String,
    pub time_format: String,
    pub no_of_decimals: i32,
}

/// JSONB array columns on the store row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonColumn {
    GstsNumbers,
    SocialMedia,
}

impl JsonColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonColumn::GstsNumbers => "gsts_numbers",
            JsonColumn::SocialMedia => "social_media",
        }
    }
}

/// Raw elements of a JSON column
///
/// Unwraps the legacy shapes: `NULL` and scalars read as empty, a string is
/// parsed once more, and a social map becomes `{ name, link }` entries.
pub fn raw_json_elements(value: Option<&Value>, column: &str) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            // A string inside the string is not unwrapped again
            Ok(Value::String(_)) => {
                tracing::warn!(column, "JSON column holds a nested string, ignoring");
                Vec::new()
            }
            Ok(inner) => raw_json_elements(Some(&inner), column),
            Err(e) => {
                tracing::warn!(column, error = %e, "JSON column holds an unparseable string");
                Vec::new()
            }
        },
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, link)| serde_json::json!({ "name": key, "link": link }))
            .collect(),
        Some(other) => {
            tracing::warn!(column, value = %other, "JSON column is not an array");
            Vec::new()
        }
    }
}

/// Decodes a JSON column into a list, tolerating legacy shapes
///
/// Never fails: anything unreadable becomes an empty list or is skipped, with
/// a warning naming `column`.
pub fn decode_json_array<T: DeserializeOwned>(value: Option<&Value>, column: &str) -> Vec<T> {
    raw_json_elements(value, column)
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(column, index, error = %e, "Skipping malformed JSON array element");
                None
            }
        })
        .collect()
}

/// One edit to a JSON array column
#[derive(Debug, Clone, PartialEq)]
pub enum ListEdit<T> {
    /// Add records after the existing ones
    Append(Vec<T>),

    /// Remove the record at this position of the decoded list
    Remove(usize),

    /// Swap the whole list for these records
    Replace(Vec<T>),
}

/// Applies `edit` to the raw elements of a column
///
/// Elements that do not decode as `T` are never touched by `Append` or
/// `Remove`; a `Remove` index counts decodable elements only, matching what
/// clients were shown. `Replace` discards everything stored.
///
/// # Errors
///
/// - [`StoreError::IndexOutOfRange`] when `Remove` addresses no record
/// - [`StoreError::Encode`] when a record cannot be serialized
pub fn apply_list_edit<T>(raw: &mut Vec<Value>, edit: ListEdit<T>) -> Result<(), StoreError>
where
    T: Serialize + DeserializeOwned,
{
    match edit {
        ListEdit::Append(records) => {
            for record in records {
                raw.push(serde_json::to_value(record)?);
            }
        }
        ListEdit::Remove(index) => {
            let visible: Vec<usize> = raw
                .iter()
                .enumerate()
                .filter(|(_, item)| serde_json::from_value::<T>((*item).clone()).is_ok())
                .map(|(position, _)| position)
                .collect();

            let position = *visible.get(index).ok_or(StoreError::IndexOutOfRange {
                index,
                len: visible.len(),
            })?;
            raw.remove(position);
        }
        ListEdit::Replace(records) => {
            *raw = records
                .into_iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?;
        }
    }
    Ok(())
}

impl Store {
    /// Returns the current store, if one exists
    pub async fn current(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {} FROM stores WHERE id = ({})",
            STORE_COLUMNS, CURRENT_STORE
        ))
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Store::from))
    }

    /// Returns the current store or [`StoreError::NotFound`]
    pub async fn require(pool: &PgPool) -> Result<Self, StoreError> {
        Self::current(pool).await?.ok_or(StoreError::NotFound)
    }

    /// Inserts the default store row
    ///
    /// Callers check [`Store::current`] first; see `db::seed`.
    pub async fn create_default(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r#"
            INSERT INTO stores (name, slug, description, image, status, type, address, city,
                                country, zip, phone, mobile, email, website, currency,
                                currency_symbol, social_media, gsts_numbers)
            VALUES ('Default Store', 'default-store', 'Default Description', $1, 'active',
                    'physical', 'Default Address', 'Default City', 'Default Country',
                    'Default Zip', '1234567890', '1234567890', 'default@example.com',
                    'https://default.com', 'USD', '$', '[]'::jsonb, '[]'::jsonb)
            RETURNING {}
            "#,
            STORE_COLUMNS
        ))
        .bind(DEFAULT_STORE_IMAGE)
        .fetch_one(pool)
        .await?;

        tracing::info!(store_id = %row.id, "Created default store");

        Ok(row.into())
    }

    /// Replaces every profile and locale field
    pub async fn update_profile(pool: &PgPool, data: StoreProfile) -> Result<Self, StoreError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r#"
            UPDATE stores SET
                name = $1, slug = $2, description = $3, status = $4, type = $5,
                address = $6, city = $7, country = $8, zip = $9, phone = $10,
                mobile = $11, email = $12, website = $13, time_zone = $14,
                currency = $15, currency_symbol = $16, currency_placement = $17,
                thousand_separator = $18, decimal_separator = $19, date_format = $20,
                time_format = $21, no_of_decimals = $22, updated_at = NOW()
            WHERE id = ({})
            RETURNING {}
            "#,
            CURRENT_STORE, STORE_COLUMNS
        ))
        .bind(data.name)
        .bind(data.slug)
        .bind(data.description)
        .bind(data.status)
        .bind(data.store_type)
        .bind(data.address)
        .bind(data.city)
        .bind(data.country)
        .bind(data.zip)
        .bind(data.phone)
        .bind(data.mobile)
        .bind(data.email)
        .bind(data.website)
        .bind(data.time_zone)
        .bind(data.currency)
        .bind(data.currency_symbol)
        .bind(data.currency_placement)
        .bind(data.thousand_separator)
        .bind(data.decimal_separator)
        .bind(data.date_format)
        .bind(data.time_format)
        .bind(data.no_of_decimals)
        .fetch_optional(pool)
        .await?;

        row.map(Store::from).ok_or(StoreError::NotFound)
    }

    /// Points the store image at `image`
    ///
    /// # Returns
    ///
    /// The updated store and the path it replaced, so the caller can discard
    /// the old file.
    pub async fn update_image(pool: &PgPool, image: &str) -> Result<(Self, String), StoreError> {
        let mut tx = pool.begin().await?;

        let (id, previous): (Uuid, String) = sqlx::query_as(&format!(
            "SELECT id, image FROM stores WHERE id = ({}) FOR UPDATE",
            CURRENT_STORE
        ))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "UPDATE stores SET image = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            STORE_COLUMNS
        ))
        .bind(id)
        .bind(image)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((row.into(), previous))
    }

    /// Runs `edit` against one JSON array column under a row lock
    ///
    /// The store row is selected `FOR UPDATE` and the raw column edited and
    /// written back in the same transaction. If the edit fails nothing is
    /// written.
    ///
    /// # Returns
    ///
    /// The decoded list after the edit
    async fn edit_json_list<T>(
        pool: &PgPool,
        column: JsonColumn,
        edit: ListEdit<T>,
    ) -> Result<Vec<T>, StoreError>
    where
        T: Serialize + DeserializeOwned + Send,
    {
        let mut tx = pool.begin().await?;

        let (id, stored): (Uuid, Option<Json<Value>>) = sqlx::query_as(&format!(
            "SELECT id, {} FROM stores WHERE id = ({}) FOR UPDATE",
            column.as_str(),
            CURRENT_STORE
        ))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        let mut raw = raw_json_elements(stored.as_ref().map(|j| &j.0), column.as_str());
        apply_list_edit(&mut raw, edit)?;

        sqlx::query(&format!(
            "UPDATE stores SET {} = $2, updated_at = NOW() WHERE id = $1",
            column.as_str()
        ))
        .bind(id)
        .bind(Json(&raw))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(column = column.as_str(), len = raw.len(), "Saved store JSON column");

        let raw = Value::Array(raw);
        Ok(decode_json_array(Some(&raw), column.as_str()))
    }

    /// Appends GST records to the stored list
    ///
    /// # Returns
    ///
    /// The full list after the append
    pub async fn add_gst_numbers(
        pool: &PgPool,
        records: Vec<GstNumber>,
    ) -> Result<Vec<GstNumber>, StoreError> {
        Self::edit_json_list(pool, JsonColumn::GstsNumbers, ListEdit::Append(records)).await
    }

    /// Removes the GST record at `index`
    pub async fn remove_gst_number(
        pool: &PgPool,
        index: usize,
    ) -> Result<Vec<GstNumber>, StoreError> {
        Self::edit_json_list(pool, JsonColumn::GstsNumbers, ListEdit::<GstNumber>::Remove(index))
            .await
    }

    /// Returns the stored social media links
    pub async fn social_links(pool: &PgPool) -> Result<Vec<SocialMediaLink>, StoreError> {
        Ok(Self::require(pool).await?.social_media)
    }

    /// Appends social media links to the stored list
    pub async fn add_social_links(
        pool: &PgPool,
        links: Vec<SocialMediaLink>,
    ) -> Result<Vec<SocialMediaLink>, StoreError> {
        Self::edit_json_list(pool, JsonColumn::SocialMedia, ListEdit::Append(links)).await
    }

    /// Removes the social media link at `index`
    pub async fn remove_social_link(
        pool: &PgPool,
        index: usize,
    ) -> Result<Vec<SocialMediaLink>, StoreError> {
        Self::edit_json_list(
            pool,
            JsonColumn::SocialMedia,
            ListEdit::<SocialMediaLink>::Remove(index),
        )
        .await
    }

    /// Replaces the whole social media list
    pub async fn replace_social_links(
        pool: &PgPool,
        links: Vec<SocialMediaLink>,
    ) -> Result<Vec<SocialMediaLink>, StoreError> {
        Self::edit_json_list(pool, JsonColumn::SocialMedia, ListEdit::Replace(links)).await
    }
}
