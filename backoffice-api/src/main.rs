//! # Backoffice API Server
//!
//! Admin back-office API: user management (list, create, update, status,
//! avatar, delete, bulk delete) and the store settings with their GST
//! numbers and social media links.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` supported)
//! 2. Connect to PostgreSQL and run embedded migrations
//! 3. Seed the default store, and the admin account when configured
//! 4. Serve until Ctrl-C
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p backoffice-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use backoffice_api::{app, config::Config};
use backoffice_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
        seed::{seed_admin, seed_default_store},
    },
    storage::LocalStorage,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "backoffice_api=debug,backoffice_shared=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is read before tracing so RUST_LOG and LOG_FORMAT can live there
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "Backoffice API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool).await.context("Failed to run migrations")?;

    let store = seed_default_store(&pool).await.context("Failed to seed store")?;
    tracing::info!(store_id = %store.id, name = %store.name, "Store ready");

    if let Some(admin) = &config.admin {
        seed_admin(&pool, &admin.email, &admin.password)
            .await
            .context("Failed to seed admin account")?;
    }

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("Failed to create {}", config.uploads.dir.display()))?;
    let storage = Arc::new(LocalStorage::new(
        &config.uploads.dir,
        &config.uploads.public_prefix,
    ));

    let bind_address = config.bind_address();
    let state = app::AppState::new(pool.clone(), config, storage);
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
