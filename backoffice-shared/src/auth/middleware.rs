/// Bearer authentication for Axum
///
/// [`authenticate`] validates the `Authorization: Bearer <access token>`
/// header and yields an [`AuthContext`]. The API's middleware layer inserts
/// it into the request extensions. The context identifies "the caller": the
/// user that list pinning and the self-delete rule refer to.
///
/// Only the token is checked. Loading the user row is left to the handlers
/// that need it.

use axum::{middleware, routing::get, Extension, Router};
/// use backoffice_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.user_id.to_string()
/// }
///
/// let secret = "a-secret-that-is-at-least-32-bytes-long".to_string();
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(move |req, next| {
///         jwt_auth_middleware(secret.clone(), req, next)
///     }));
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authenticated caller, available to handlers via `Extension<AuthContext>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("{0}")]
    InvalidFormat(String),

    #[error("Token expired")]
    Expired,

    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "unauthorized",
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Extracts and validates the bearer token
///
/// # Errors
///
/// - `MissingCredentials` without an `Authorization` header
/// - `InvalidFormat` when it is not `Bearer <token>`
/// - `Expired` / `InvalidToken` when validation fails (refresh tokens included)
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::Expired,
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    Ok(AuthContext {
        user_id: claims.sub,
    })
}
