//! Application setup and initialization
//!
//! All startup wiring lives here instead of main.rs: telemetry, database
//! pool and migrations, storage backend, state, and routes.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use atelier_catalog::PostgresImageRepository;
use atelier_core::Config;
use atelier_storage::create_blob_store;
use std::sync::Arc;

/// Initialize the entire application.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(&config.environment);

    tracing::info!("Configuration loaded");

    let pool = database::setup_database(&config).await?;

    let storage = create_blob_store(&config)
        .await
        .context("Failed to initialize storage backend")?;
    match storage.bucket_exists().await {
        Ok(true) => tracing::info!(backend = %storage.backend_type(), "Storage backend ready"),
        Ok(false) => tracing::warn!(
            backend = %storage.backend_type(),
            "Storage bucket missing, uploads will fail until it exists"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not verify storage bucket"),
    }

    let repository = Arc::new(PostgresImageRepository::new(pool));
    let state = Arc::new(AppState::new(repository, storage, config));

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
