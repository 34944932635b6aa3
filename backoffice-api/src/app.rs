/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use backoffice_api::{app::AppState, config::Config};
/// use backoffice_shared::storage::LocalStorage;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let storage = Arc::new(LocalStorage::new(&config.uploads.dir, &config.uploads.public_prefix));
/// let state = AppState::new(pool, config, storage);
/// let app = backoffice_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use backoffice_shared::auth::middleware::authenticate;
use backoffice_shared::storage::FileStorage;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Room for the text fields of a multipart form next to the file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Backend for uploaded images
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            storage,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /uploads/*                       # Uploaded files (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /login              # public
///     │   ├── POST /refresh            # public
///     │   └── GET  /me
///     ├── /users/
///     │   ├── GET    /                 # list (page envelope)
///     │   ├── POST   /                 # create (multipart)
///     │   ├── DELETE /bulk-delete
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── DELETE /:id
///     │   ├── PUT    /:id/status
///     │   └── POST   /:id/avatar       # multipart
///     └── /store/
///         ├── GET  /
///         ├── PUT  /
///         ├── POST /image              # multipart
///         ├── POST   /gst-numbers
///         ├── DELETE /gst-numbers/:index
///         ├── GET|PUT|POST /social-media
///         └── DELETE /social-media/:index
/// ```
///
/// Everything under `/v1` except login and refresh requires a bearer access
/// token.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Body limit sized for image uploads
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes
    let public_auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let session_routes = Router::new().route("/me", get(routes::auth::me));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route("/bulk-delete", delete(routes::users::bulk_delete_users))
        .route(
            "/:id",
            get(routes::users::show_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/:id/status", put(routes::users::update_user_status))
        .route("/:id/avatar", post(routes::users::upload_avatar));

    let store_routes = Router::new()
        .route("/", get(routes::store::show_store).put(routes::store::update_store))
        .route("/image", post(routes::store::upload_store_image))
        .route("/gst-numbers", post(routes::store::add_gst_numbers))
        .route("/gst-numbers/:index", delete(routes::store::delete_gst_number))
        .route(
            "/social-media",
            get(routes::store::list_social_links)
                .put(routes::store::replace_social_links)
                .post(routes::store::add_social_links),
        )
        .route("/social-media/:index", delete(routes::store::delete_social_link));

    // Everything below requires JWT authentication
    let protected_routes = Router::new()
        .nest("/auth", session_routes)
        .nest("/users", user_routes)
        .nest("/store", store_routes)
        .layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let body_limit = state.config.uploads.max_bytes + MULTIPART_OVERHEAD;
    let uploads = ServeDir::new(&state.config.uploads.dir);

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer access token and injects `AuthContext` into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Rejected request");
        e
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
