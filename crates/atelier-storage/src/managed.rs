//! Managed object-storage platform backend.
//!
//! Talks to a Supabase-style storage HTTP API: objects live in a public
//! bucket created on startup, uploads carry content type and cache control,
//! and public locators resolve through the platform's public-object URL.

use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;

/// Per-object size limit applied when the bucket is created (10 MB).
const BUCKET_FILE_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

/// Cache control applied to uploaded objects, in seconds.
const UPLOAD_CACHE_CONTROL_SECS: u32 = 3600;

#[derive(Debug, Deserialize)]
struct BucketInfo {
    name: String,
}

/// Managed-platform blob store implementation
#[derive(Clone)]
pub struct ManagedBlobStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl ManagedBlobStore {
    /// Create a new ManagedBlobStore and ensure the bucket exists.
    ///
    /// # Arguments
    /// * `base_url` - Platform base URL (e.g., "https://abc.supabase.co")
    /// * `service_key` - Service role key used for all storage API calls
    /// * `bucket` - Bucket name to store objects in
    pub async fn new(
        base_url: String,
        service_key: String,
        bucket: String,
    ) -> StorageResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", service_key);
        let mut auth_value = HeaderValue::from_str(&bearer)
            .map_err(|e| StorageError::ConfigError(format!("Invalid service key: {}", e)))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let store = ManagedBlobStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
        };

        store.ensure_bucket().await?;

        Ok(store)
    }

    /// Create the bucket if it does not exist yet (public, with a per-object
    /// size limit).
    async fn ensure_bucket(&self) -> StorageResult<()> {
        let url = format!("{}/storage/v1/bucket", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Failed to list buckets: {}", e)))?;

        if !response.status().is_success() {
            return Err(StorageError::BackendError(format!(
                "Failed to list buckets: HTTP {}",
                response.status()
            )));
        }

        let buckets: Vec<BucketInfo> = response
            .json()
            .await
            .map_err(|e| StorageError::BackendError(format!("Invalid bucket listing: {}", e)))?;

        if buckets.iter().any(|b| b.name == self.bucket) {
            return Ok(());
        }

        tracing::info!(bucket = %self.bucket, "Creating storage bucket");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "name": self.bucket,
                "public": true,
                "file_size_limit": BUCKET_FILE_SIZE_LIMIT,
            }))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Failed to create bucket: {}", e)))?;

        if !response.status().is_success() {
            return Err(StorageError::BackendError(format!(
                "Failed to create bucket {}: HTTP {}",
                self.bucket,
                response.status()
            )));
        }

        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    fn generate_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

#[async_trait]
impl BlobStore for ManagedBlobStore {
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let url = self.object_url(key);
        let size = data.len();
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, UPLOAD_CACHE_CONTROL_SECS.to_string())
            // Upsert keeps retried ingestions from failing on an existing key.
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                http_status = %status,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Managed storage upload failed"
            );
            return Err(StorageError::UploadFailed(format!(
                "HTTP {} uploading {}",
                status, key
            )));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Managed storage upload successful"
        );

        Ok(self.generate_url(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let url = self.object_url(key);
        let start = std::time::Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(key.to_string()));
        }

        if !response.status().is_success() {
            return Err(StorageError::DownloadFailed(format!(
                "HTTP {} downloading {}",
                response.status(),
                key
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Managed storage download successful"
        );

        Ok(bytes.to_vec())
    }

    fn public_locator_of(&self, key: &str) -> String {
        self.generate_url(key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let url = self.object_url(key);
        let start = std::time::Instant::now();

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        // Missing object counts as deleted so retried teardowns converge.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(
                bucket = %self.bucket,
                key = %key,
                "Managed storage delete target already absent"
            );
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(
                bucket = %self.bucket,
                key = %key,
                http_status = %status,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Managed storage delete failed"
            );
            return Err(StorageError::DeleteFailed(format!(
                "HTTP {} deleting {}",
                status, key
            )));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Managed storage delete successful"
        );

        Ok(())
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        let url = format!("{}/storage/v1/bucket/{}", self.base_url, self.bucket);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StorageError::BackendError(format!(
                "HTTP {} checking bucket {}",
                status, self.bucket
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Managed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_locator_layout() {
        let store = ManagedBlobStore {
            client: reqwest::Client::new(),
            base_url: "https://abc.supabase.co".to_string(),
            bucket: "images".to_string(),
        };

        assert_eq!(
            store.public_locator_of("id/medium/image.webp"),
            "https://abc.supabase.co/storage/v1/object/public/images/id/medium/image.webp"
        );
    }
}
