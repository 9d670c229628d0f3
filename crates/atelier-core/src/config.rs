//! Configuration module
//!
//! Environment-driven configuration for the API binary and the storage
//! factory. Required values fail fast at startup; backend-specific values
//! stay optional here and are validated by the component that needs them.

use std::env;
use std::str::FromStr;

use crate::error::AppError;
use crate::storage_types::StorageBackend;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub environment: String,
    // Storage backend selection and its per-backend settings
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Set for S3-compatible providers; AWS proper leaves this unset.
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub managed_storage_url: Option<String>,
    pub managed_storage_key: Option<String>,
    pub managed_storage_bucket: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` is required; everything else has a default or is
    /// validated later by the storage factory.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = require_env("DATABASE_URL")?;

        let server_port = match env::var("SERVER_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::InvalidInput(format!("SERVER_PORT is not a valid port: {}", raw))
            })?,
            Err(_) => DEFAULT_SERVER_PORT,
        };

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => Some(
                StorageBackend::from_str(&raw)
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            server_port,
            database_url,
            db_max_connections,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            managed_storage_url: env::var("MANAGED_STORAGE_URL").ok(),
            managed_storage_key: env::var("MANAGED_STORAGE_KEY").ok(),
            managed_storage_bucket: env::var("MANAGED_STORAGE_BUCKET").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.aws_region.as_deref()
    }

    pub fn managed_storage_url(&self) -> Option<&str> {
        self.managed_storage_url.as_deref()
    }

    pub fn managed_storage_key(&self) -> Option<&str> {
        self.managed_storage_key.as_deref()
    }

    pub fn managed_storage_bucket(&self) -> Option<&str> {
        self.managed_storage_bucket.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }
}

fn require_env(name: &'static str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::InvalidInput(format!("{} is not set", name)))
}
