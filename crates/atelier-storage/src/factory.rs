#[cfg(feature = "storage-local")]
use crate::LocalBlobStore;
#[cfg(feature = "storage-managed")]
use crate::ManagedBlobStore;
#[cfg(feature = "storage-s3")]
use crate::S3BlobStore;
use crate::{BlobStore, StorageBackend, StorageError, StorageResult};
use atelier_core::Config;
use std::sync::Arc;

#[cfg(any(
    feature = "storage-s3",
    feature = "storage-managed",
    feature = "storage-local"
))]
fn require(value: Option<&str>, var: &str) -> StorageResult<String> {
    value
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", var)))
}

#[cfg(not(all(
    feature = "storage-s3",
    feature = "storage-managed",
    feature = "storage-local"
)))]
fn disabled(backend: StorageBackend, feature: &str) -> StorageError {
    StorageError::ConfigError(format!(
        "{} backend selected but the {} feature is not enabled",
        backend, feature
    ))
}

/// Build the blob store selected by `STORAGE_BACKEND` (default: local).
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    let backend = config.storage_backend().unwrap_or(StorageBackend::Local);

    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = require(config.s3_bucket(), "S3_BUCKET")?;
            let region = match config.s3_region().or(config.aws_region()) {
                Some(region) => region.to_string(),
                None => return Err(StorageError::ConfigError(
                    "S3_REGION or AWS_REGION not configured".to_string(),
                )),
            };
            let endpoint = config.s3_endpoint().map(String::from);
            Ok(Arc::new(S3BlobStore::new(bucket, region, endpoint).await?))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(disabled(backend, "storage-s3")),

        #[cfg(feature = "storage-managed")]
        StorageBackend::Managed => {
            let base_url = require(config.managed_storage_url(), "MANAGED_STORAGE_URL")?;
            let service_key = require(config.managed_storage_key(), "MANAGED_STORAGE_KEY")?;
            let bucket = require(config.managed_storage_bucket(), "MANAGED_STORAGE_BUCKET")?;
            Ok(Arc::new(
                ManagedBlobStore::new(base_url, service_key, bucket).await?,
            ))
        }

        #[cfg(not(feature = "storage-managed"))]
        StorageBackend::Managed => Err(disabled(backend, "storage-managed")),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = require(config.local_storage_path(), "LOCAL_STORAGE_PATH")?;
            let base_url = require(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?;
            Ok(Arc::new(LocalBlobStore::new(base_path, base_url).await?))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(disabled(backend, "storage-local")),
    }
}
