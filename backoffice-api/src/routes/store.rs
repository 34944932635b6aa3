/// Store settings endpoints
///
/// There is one store. Its GST numbers and social media links are JSON
/// arrays on the store row, edited by appending records or removing one by
/// position.
///
/// # Endpoints
///
/// - `GET /v1/store` - Settings, with decoded GST and social lists
/// - `PUT /v1/store` - Replace profile and locale fields
/// - `POST /v1/store/image` - Replace the store image (multipart `image` file)
/// - `POST /v1/store/gst-numbers` - Append one record or a batch
/// - `DELETE /v1/store/gst-numbers/:index` - Remove one record
/// - `GET /v1/store/social-media` - List links
/// - `PUT /v1/store/social-media` - Replace all links
/// - `POST /v1/store/social-media` - Append one link or a batch
/// - `DELETE /v1/store/social-media/:index` - Remove one link
///
/// # Example
///
/// ```text
/// POST /v1/store/gst-numbers
///
/// [{ "name": "GSTIN", "number": "22AAAAA0000A1Z5", "showInInvoice": true }]
/// ```
///
/// answers with the whole list after the append:
///
/// ```json
/// {
///   "flash": { "kind": "success", "message": "GST information updated successfully", "sound": "update" },
///   "data": [{ "name": "GSTIN", "number": "22AAAAA0000A1Z5", "showInInvoice": true }]
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::multipart::MultipartForm,
};
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use backoffice_shared::{
    flash::{ActionResponse, Flash, Sound},
    forms::{
        store::{GstNumberForm, SocialMediaLinkForm, SocialMediaLinksForm, StoreProfileForm},
        Form, OneOrMany,
    },
    models::store::{GstNumber, SocialMediaLink, Store},
    storage::{
        upload::{discard_replaced, store_image, STORE_IMAGE_DIR},
        FileStorage,
    },
};
use serde::{Deserialize, Serialize};

/// The store as clients see it: the model plus a fetchable image URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResource {
    #[serde(flatten)]
    pub store: Store,

    pub image_url: String,
}

impl StoreResource {
    pub fn new(store: Store, storage: &dyn FileStorage) -> Self {
        let image_url = storage.public_url(&store.image);
        Self { store, image_url }
    }
}

/// Store settings
///
/// # Errors
///
/// - `404 Not Found`: No store row exists
pub async fn show_store(State(state): State<AppState>) -> ApiResult<Json<StoreResource>> {
    let store = Store::require(&state.db).await?;

    Ok(Json(StoreResource::new(store, state.storage.as_ref())))
}

/// Replace profile and locale fields
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Field validation failed
/// - `404 Not Found`: No store row exists
pub async fn update_store(
    State(state): State<AppState>,
    Json(form): Json<StoreProfileForm>,
) -> ApiResult<Json<ActionResponse<StoreResource>>> {
    form.check()?;

    let store = Store::update_profile(&state.db, form.into_profile()).await?;

    tracing::info!(store_id = %store.id, "Updated store settings");

    Ok(Json(ActionResponse::with_data(
        Flash::success("Store updated successfully").with_sound(Sound::Update),
        StoreResource::new(store, state.storage.as_ref()),
    )))
}

/// Replace the store image
///
/// The previous image is deleted best-effort unless it is the placeholder.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: No `image` file, or it breaks the image rules
/// - `404 Not Found`: No store row exists
pub async fn upload_store_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ActionResponse<StoreResource>>> {
    let mut form = MultipartForm::read(multipart).await?;
    let upload = form
        .take_file("image")
        .ok_or_else(|| ApiError::field("image", "The image field is required"))?;

    let storage = state.storage.as_ref();
    let path = store_image(storage, STORE_IMAGE_DIR, &upload, state.config.uploads.max_bytes)
        .await
        .map_err(|e| ApiError::upload("image", e))?;

    let (store, previous) = match Store::update_image(&state.db, &path).await {
        Ok(updated) => updated,
        Err(e) => {
            discard_replaced(storage, Some(&path)).await;
            return Err(e.into());
        }
    };

    discard_replaced(storage, Some(&previous)).await;

    Ok(Json(ActionResponse::with_data(
        Flash::success("Store image updated successfully").with_sound(Sound::Update),
        StoreResource::new(store, storage),
    )))
}

/// Append GST records
///
/// Accepts a single record or an array. When `GST_STRICT_FORMAT` is on,
/// numbers must match the GSTIN pattern.
pub async fn add_gst_numbers(
    State(state): State<AppState>,
    Json(payload): Json<OneOrMany<GstNumberForm>>,
) -> ApiResult<Json<ActionResponse<Vec<GstNumber>>>> {
    let strict = state.config.validation.gst_strict_format;
    payload.check_each("gstsNumbers", |record| record.check_with(strict))?;

    let records: Vec<GstNumber> = payload.into_vec().into_iter().map(Into::into).collect();
    let added = records.len();
    let numbers = Store::add_gst_numbers(&state.db, records).await?;

    tracing::info!(added, total = numbers.len(), "Appended GST numbers");

    Ok(Json(ActionResponse::with_data(
        Flash::success("GST information updated successfully").with_sound(Sound::Update),
        numbers,
    )))
}

/// Remove the GST record at `index`
///
/// # Errors
///
/// - `404 Not Found`: No store row, or no record at `index`
pub async fn delete_gst_number(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<ActionResponse<Vec<GstNumber>>>> {
    let numbers = Store::remove_gst_number(&state.db, index).await?;

    Ok(Json(ActionResponse::with_data(
        Flash::success("GST number deleted successfully").with_sound(Sound::Delete),
        numbers,
    )))
}

/// List social media links
pub async fn list_social_links(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SocialMediaLink>>> {
    Ok(Json(Store::social_links(&state.db).await?))
}

/// Replace every social media link
///
/// `{ "socialMediaLinks": [] }` clears the list.
pub async fn replace_social_links(
    State(state): State<AppState>,
    Json(form): Json<SocialMediaLinksForm>,
) -> ApiResult<Json<ActionResponse<Vec<SocialMediaLink>>>> {
    form.check()?;

    let links = Store::replace_social_links(&state.db, form.into_links()).await?;

    Ok(Json(ActionResponse::with_data(
        Flash::success("Social media links updated successfully").with_sound(Sound::Update),
        links,
    )))
}

/// Append social media links
///
/// Accepts a single link or an array.
pub async fn add_social_links(
    State(state): State<AppState>,
    Json(payload): Json<OneOrMany<SocialMediaLinkForm>>,
) -> ApiResult<Json<ActionResponse<Vec<SocialMediaLink>>>> {
    payload.check_each("socialMediaLinks", |link| link.check())?;

    let links: Vec<SocialMediaLink> = payload.into_vec().into_iter().map(Into::into).collect();
    let links = Store::add_social_links(&state.db, links).await?;

    Ok(Json(ActionResponse::with_data(
        Flash::success("Social media links updated successfully").with_sound(Sound::Update),
        links,
    )))
}

/// Remove the social media link at `index`
///
/// # Errors
///
/// - `404 Not Found`: No store row, or no link at `index`
pub async fn delete_social_link(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<ActionResponse<Vec<SocialMediaLink>>>> {
    let links = Store::remove_social_link(&state.db, index).await?;

    Ok(Json(ActionResponse::with_data(
        Flash::success("Social media link deleted successfully").with_sound(Sound::Delete),
        links,
    )))
}
