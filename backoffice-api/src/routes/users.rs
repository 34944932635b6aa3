/// User management endpoints
///
/// # Endpoints
///
/// - `GET /v1/users` - Paginated, searchable, sortable list
/// - `POST /v1/users` - Create (multipart, optional `avatar` file)
/// - `DELETE /v1/users/bulk-delete` - Soft-delete a set of users
/// - `GET /v1/users/:id` - Show one user
/// - `PUT /v1/users/:id` - Partial profile update
/// - `PUT /v1/users/:id/status` - Change status
/// - `POST /v1/users/:id/avatar` - Replace the avatar (multipart `avatar` file)
/// - `DELETE /v1/users/:id` - Soft-delete one user
///
/// Mutations answer with an action envelope `{ flash, data? }`. Neither
/// delete endpoint lets the caller remove its own account.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::multipart::MultipartForm,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use backoffice_shared::{
    auth::{middleware::AuthContext, password},
    flash::{ActionResponse, Flash, Sound},
    forms::{
        user::{BulkDeleteForm, CreateUserForm, UpdateStatusForm, UpdateUserForm},
        Form,
    },
    listing::{ListParams, ListQuery, Page},
    models::user::{targets_self, User},
    storage::{
        upload::{discard_replaced, store_image, AVATAR_DIR},
        FileStorage,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SELF_DELETE: &str = "You cannot delete your own account";

/// A user as clients see it: the model plus a fetchable avatar URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResource {
    #[serde(flatten)]
    pub user: User,

    pub avatar_url: Option<String>,
}

impl UserResource {
    pub fn new(user: User, storage: &dyn FileStorage) -> Self {
        let avatar_url = user.avatar.as_deref().map(|path| storage.public_url(path));
        Self { user, avatar_url }
    }
}

/// List response: the page envelope plus the unfiltered user count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    #[serde(flatten)]
    pub page: Page<UserResource>,

    pub all_users: i64,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
    pub deleted: u64,
}

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// List users
///
/// # Endpoint
///
/// ```text
/// GET /v1/users?page=2&pageSize=10&search=smith&sort=[{"id":"email","desc":true}]
/// ```
///
/// The caller's own row is pinned to the top of the page it appears on.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: `sort` is malformed or names an unsortable column
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let params = ListParams::try_from(query)?.normalized();

    let page = User::list(&state.db, &params, Some(auth.user_id)).await?;
    let all_users = User::count(&state.db).await?;

    let storage = state.storage.as_ref();
    Ok(Json(UserListResponse {
        page: page.map(|user| UserResource::new(user, storage)),
        all_users,
    }))
}

/// Create a user
///
/// # Endpoint
///
/// ```text
/// POST /v1/users
/// Content-Type: multipart/form-data
///
/// username, user_code, first_name, last_name, email, password,
/// confirm_password, gender, phone?, address?, city?, avatar? (file)
/// ```
///
/// Without an avatar file the gender placeholder is used.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Field validation or image rules failed
/// - `409 Conflict`: Username, user code or email already taken
pub async fn create_user(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ActionResponse<UserResource>>)> {
    let mut form = MultipartForm::read(multipart).await?;

    let input = CreateUserForm {
        username: form.text_or_default("username"),
        user_code: form.text_or_default("user_code"),
        first_name: form.text_or_default("first_name"),
        last_name: form.text_or_default("last_name"),
        phone: form.text("phone"),
        email: form.text_or_default("email"),
        password: form.text_or_default("password"),
        confirm_password: form.text_or_default("confirm_password"),
        gender: form.text_or_default("gender"),
        address: form.text("address"),
        city: form.text("city"),
    };
    input.check()?;

    let storage = state.storage.as_ref();
    let avatar = match form.take_file("avatar") {
        Some(upload) => Some(
            store_image(storage, AVATAR_DIR, &upload, state.config.uploads.max_bytes)
                .await
                .map_err(|e| ApiError::upload("avatar", e))?,
        ),
        None => None,
    };

    let password_hash = password::hash_password(&input.password)?;
    let data = input.into_create_user(password_hash, avatar.clone())?;

    let user = match User::create(&state.db, data).await {
        Ok(user) => user,
        Err(e) => {
            // The row was never written, so the uploaded file is orphaned
            discard_replaced(storage, avatar.as_deref()).await;
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data(
            Flash::success("User created successfully").with_sound(Sound::Create),
            UserResource::new(user, storage),
        )),
    ))
}

/// Show one user
///
/// # Errors
///
/// - `404 Not Found`: No live user with this id
pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResource>> {
    let user = User::find_by_id(&state.db, id).await?.ok_or_else(not_found)?;

    Ok(Json(UserResource::new(user, state.storage.as_ref())))
}

/// Update profile fields
///
/// Only the fields present in the body change. An empty string clears
/// phone, address, city, state, zip or country.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or the body changes nothing
/// - `404 Not Found`: No live user with this id
/// - `409 Conflict`: New username, user code or email already taken
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateUserForm>,
) -> ApiResult<Json<ActionResponse<UserResource>>> {
    form.check()?;

    let update = form.into_update_user()?;
    if update.is_empty() {
        return Err(ApiError::field("body", "No fields to update"));
    }

    let user = User::update(&state.db, id, update).await?.ok_or_else(not_found)?;

    tracing::info!(user_id = %id, "Updated user");

    Ok(Json(ActionResponse::with_data(
        Flash::success("User updated successfully").with_sound(Sound::Update),
        UserResource::new(user, state.storage.as_ref()),
    )))
}

/// Change account status
///
/// # Endpoint
///
/// ```text
/// PUT /v1/users/:id/status
///
/// { "status": "active" }
/// ```
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateStatusForm>,
) -> ApiResult<Json<ActionResponse<UserResource>>> {
    form.check()?;
    let status = form.status()?;

    let user = User::update_status(&state.db, id, status)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(user_id = %id, status = %status, "Updated user status");

    Ok(Json(ActionResponse::with_data(
        Flash::success(format!("User status updated successfully {}", status))
            .with_sound(Sound::Update),
        UserResource::new(user, state.storage.as_ref()),
    )))
}

/// Replace the avatar
///
/// The previous file is deleted best-effort unless it is a placeholder.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: No `avatar` file, or it breaks the image rules
/// - `404 Not Found`: No live user with this id
pub async fn upload_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<ActionResponse<UserResource>>> {
    let mut form = MultipartForm::read(multipart).await?;
    let upload = form
        .take_file("avatar")
        .ok_or_else(|| ApiError::field("avatar", "The avatar field is required"))?;

    let existing = User::find_by_id(&state.db, id).await?.ok_or_else(not_found)?;

    let storage = state.storage.as_ref();
    let path = store_image(storage, AVATAR_DIR, &upload, state.config.uploads.max_bytes)
        .await
        .map_err(|e| ApiError::upload("avatar", e))?;

    let Some(user) = User::update_avatar(&state.db, id, &path).await? else {
        // Deleted between the lookup and the update
        discard_replaced(storage, Some(&path)).await;
        return Err(not_found());
    };

    discard_replaced(storage, existing.avatar.as_deref()).await;

    Ok(Json(ActionResponse::with_data(
        Flash::success("Avatar updated successfully").with_sound(Sound::Update),
        UserResource::new(user, storage),
    )))
}

/// Soft-delete one user
///
/// # Errors
///
/// - `403 Forbidden`: The caller targeted its own account
/// - `404 Not Found`: No live user with this id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ActionResponse<()>>> {
    if targets_self(auth.user_id, &[id]) {
        return Err(ApiError::Forbidden(SELF_DELETE.to_string()));
    }

    if !User::soft_delete(&state.db, id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = %id, deleted_by = %auth.user_id, "Deleted user");

    Ok(Json(ActionResponse::new(
        Flash::success("User deleted successfully").with_sound(Sound::Delete),
    )))
}

/// Soft-delete a set of users
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/users/bulk-delete
///
/// { "ids": ["uuid", "uuid"] }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: `ids` is empty
/// - `403 Forbidden`: The caller's own id is in the set; nothing is deleted
/// - `404 Not Found`: None of the ids named a live user
pub async fn bulk_delete_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(form): Json<BulkDeleteForm>,
) -> ApiResult<Json<ActionResponse<BulkDeleteResult>>> {
    form.check()?;

    if targets_self(auth.user_id, &form.ids) {
        tracing::warn!(user_id = %auth.user_id, "Rejected bulk delete including caller");
        return Err(ApiError::Forbidden(SELF_DELETE.to_string()));
    }

    let deleted = User::soft_delete_many(&state.db, &form.ids).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Users deleted failed".to_string()));
    }

    Ok(Json(ActionResponse::with_data(
        Flash::success(format!("{} users deleted successfully", deleted)).with_sound(Sound::Delete),
        BulkDeleteResult { deleted },
    )))
}
