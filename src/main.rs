//! Lookup Gateway - Main Application Entry Point
//!
//! A gated front-end for a third-party lookup API. Holders of an access key open a
//! portal session and run lookups from a fixed endpoint menu; an administrator manages
//! the pool of access keys and reviews the log of lookups made.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: JSON blobs on disk, or PostgreSQL with sqlx, behind one trait
//! - **Sessions**: bearer tokens, SHA-256 hashed in an in-memory registry
//! - **Upstream**: reqwest GET per lookup
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Open the configured storage backend (running migrations for Postgres)
//! 3. Seed the bootstrap key into an empty store, if configured
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod session;
mod state;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, StorageBackend},
    services::{key_service, lookup_service::LookupClient},
    session::SessionStore,
    state::AppState,
    storage::{DynStorage, local::LocalStorage, postgres::PgStorage},
};

/// Open whichever backend the configuration selects.
async fn open_storage(config: &Config) -> anyhow::Result<DynStorage> {
    match config.storage_backend {
        StorageBackend::Local => {
            let storage = LocalStorage::open(&config.local_store_dir).await?;
            tracing::info!(dir = %config.local_store_dir.display(), "Local blob storage opened");
            Ok(Arc::new(storage))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(config::ConfigError::MissingDatabaseUrl)?;

            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            Ok(Arc::new(PgStorage::new(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!(backend = ?config.storage_backend, "Configuration loaded");

    let storage = open_storage(&config).await?;

    if let Some((name, value)) = config.bootstrap_key() {
        if key_service::seed_if_empty(storage.as_ref(), name, value).await? {
            tracing::info!(name, "Bootstrap access key created");
        }
    }

    let lookup = LookupClient::new(
        config.lookup_base_url.clone(),
        config.lookup_timeout_secs.map(Duration::from_secs),
    )?;

    let state = AppState {
        storage,
        sessions: SessionStore::new(config.session_ttl()),
        lookup,
        admin_password: config.admin_password.clone(),
        revalidate_portal_sessions: config.revalidate_portal_sessions,
    };

    let app = routes::router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
