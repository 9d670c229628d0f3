use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Filesystem-backed blob store for development and tests.
///
/// Objects live under `base_path` with the key as the relative path, and
/// locators are built from `base_url`, so a static file server pointed at
/// the directory serves them directly.
#[derive(Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "cannot create storage root {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore {
            base_path,
            base_url,
        })
    }

    /// Resolve a key to a path under the storage root. Keys that could
    /// escape the root are rejected.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "key must be a relative path without traversal segments".to_string(),
            ));
        }

        let path = self.base_path.join(key);

        let root = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("cannot canonicalize storage root: {}", e))
        })?;

        if let Ok(resolved) = path.canonicalize() {
            if resolved.strip_prefix(&root).is_err() {
                return Err(StorageError::InvalidKey(
                    "key resolves outside the storage root".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn locator(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // Write to a sibling temp file then rename, so the final key never
        // exposes a partially written object.
        let tmp_path = path.with_extension("part");

        let mut file = fs::File::create(&tmp_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "cannot create {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "cannot write {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("cannot sync {}: {}", tmp_path.display(), e))
        })?;

        fs::rename(&tmp_path, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!("cannot finalize {}: {}", path.display(), e))
        })?;

        let url = self.locator(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "local put complete"
        );

        Ok(url)
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("cannot read {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "local get complete"
        );

        Ok(data)
    }

    fn public_locator_of(&self, key: &str) -> String {
        self.locator(key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("cannot remove {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "local delete complete"
        );

        Ok(())
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        Ok(tokio::fs::try_exists(&self.base_path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
