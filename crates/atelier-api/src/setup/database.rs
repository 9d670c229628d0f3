//! Connection pool and migrations.

use anyhow::{Context, Result};
use atelier_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

/// Open the Postgres pool and bring the schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .context("cannot connect to Postgres")?;

    tracing::info!(max_connections = config.db_max_connections, "pool ready");

    let migrations_dir =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../atelier-catalog/migrations");
    sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("cannot load migrations")?
        .run(&pool)
        .await
        .context("cannot apply migrations")?;

    tracing::info!("migrations applied");
    Ok(pool)
}
