use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use atelier_core::constants::OBJECT_CACHE_CONTROL;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload};
use std::time::Instant;

/// Blob store backed by S3 or any S3-compatible service.
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

impl S3BlobStore {
    /// Connect to `bucket` in `region`. Credentials come from the standard
    /// AWS environment variables. Pass `endpoint_url` to target an
    /// S3-compatible provider such as MinIO or DigitalOcean Spaces; plain
    /// `http://` endpoints are permitted for local development.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3BlobStore {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Public locator for `key`: virtual-hosted AWS URL by default,
    /// path-style `{endpoint}/{bucket}/{key}` when a custom endpoint is set.
    fn locator(&self, key: &str) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        attributes.insert(Attribute::CacheControl, OBJECT_CACHE_CONTROL.into());

        let start = Instant::now();
        self.store
            .put_opts(
                &location,
                PutPayload::from(Bytes::from(data)),
                PutOptions {
                    attributes,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = elapsed_ms(start),
                    "s3 put failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = elapsed_ms(start),
            "s3 put complete"
        );

        Ok(self.locator(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let start = Instant::now();
        let location = Path::from(key.to_string());

        let object = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    "s3 get failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = object
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = elapsed_ms(start),
            "s3 get complete"
        );

        Ok(bytes.to_vec())
    }

    fn public_locator_of(&self, key: &str) -> String {
        self.locator(key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = Instant::now();
        let location = Path::from(key.to_string());

        match self.store.delete(&location).await {
            Ok(()) => {}
            // Missing object counts as deleted so retried teardowns converge.
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(
                    bucket = %self.bucket,
                    key = %key,
                    "s3 delete target already absent"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = elapsed_ms(start),
                    "s3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = elapsed_ms(start),
            "s3 delete complete"
        );

        Ok(())
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        match self.store.list_with_delimiter(None).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locator_aws_virtual_hosted_format() {
        let store = S3BlobStore::new("my-bucket".to_string(), "us-east-1".to_string(), None)
            .await
            .unwrap();

        assert_eq!(
            store.public_locator_of("id/thumbnail/image.jpg"),
            "https://my-bucket.s3.us-east-1.amazonaws.com/id/thumbnail/image.jpg"
        );
    }

    #[tokio::test]
    async fn test_locator_custom_endpoint_path_style() {
        let store = S3BlobStore::new(
            "my-bucket".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(
            store.public_locator_of("id/original/photo.png"),
            "http://localhost:9000/my-bucket/id/original/photo.png"
        );
    }
}
