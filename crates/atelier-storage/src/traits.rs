//! The backend-neutral blob store contract.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Failures a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("backend failure: {0}")]
    BackendError(String),

    #[error("io failure: {0}")]
    IoError(#[from] std::io::Error),

    #[error("configuration: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Blob store abstraction trait
///
/// All backends (S3-compatible, managed platform, local filesystem) must
/// satisfy identical semantics: `put` is atomic from the caller's
/// perspective (no partial object is ever visible under the final key) and
/// `delete` on a non-existent key is treated as success, so a retried
/// teardown converges instead of failing on objects a prior run removed.
///
/// **Key format:** `{image_id}/{variant_type}/{filename}` for derived
/// variants, `{image_id}/original/{original_filename}` for the source.
/// See the `keys` module.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload an object under the given key and return its public locator.
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Download an object by its key.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Resolve the public locator for a key without touching the backend.
    fn public_locator_of(&self, key: &str) -> String;

    /// Delete an object by its key. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether the configured bucket (or base directory) exists.
    async fn bucket_exists(&self) -> StorageResult<bool>;

    /// Which backend family this store belongs to.
    fn backend_type(&self) -> StorageBackend;
}
