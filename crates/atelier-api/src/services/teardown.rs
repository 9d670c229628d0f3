//! Teardown: remove every storage object for an image, then its catalog rows.
//!
//! Storage deletes run first; the catalog row is removed only after every
//! object is gone. A failed delete aborts the row removal and reports the
//! surviving locators, so a retry can converge (backends treat deleting a
//! missing object as success).

use atelier_catalog::ImageRepository;
use atelier_core::constants::VARIANT_CONCURRENCY;
use atelier_core::AppError;
use atelier_processing::VariantPlanner;
use atelier_storage::keys::{original_key, variant_key};
use atelier_storage::BlobStore;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct TeardownService {
    repository: Arc<dyn ImageRepository>,
    storage: Arc<dyn BlobStore>,
}

impl TeardownService {
    pub fn new(repository: Arc<dyn ImageRepository>, storage: Arc<dyn BlobStore>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Delete an image's storage objects and catalog rows.
    ///
    /// The deleted key set is derived from the fixed variant plan plus the
    /// original, not from the variant rows: webp rows do not carry their size
    /// directory, and a row missing after a partial ingestion must not leave
    /// its object behind.
    #[tracing::instrument(skip(self), fields(image_id = %image_id, operation = "teardown"))]
    pub async fn teardown(&self, image_id: Uuid) -> Result<(), AppError> {
        let image = self
            .repository
            .find(image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

        let mut keys = vec![original_key(image_id, &image.original_filename)];
        for spec in VariantPlanner::plan() {
            keys.push(variant_key(image_id, spec.size, spec.format.filename()));
        }

        let storage = self.storage.clone();
        let failed: Vec<String> = stream::iter(keys)
            .map(|key| {
                let storage = storage.clone();
                async move {
                    match storage.delete(&key).await {
                        Ok(()) => None,
                        Err(e) => {
                            tracing::error!(error = %e, key = %key, "Storage delete failed");
                            Some(storage.public_locator_of(&key))
                        }
                    }
                }
            })
            .buffer_unordered(VARIANT_CONCURRENCY)
            .filter_map(|outcome| async { outcome })
            .collect()
            .await;

        if !failed.is_empty() {
            return Err(AppError::Storage(format!(
                "Failed to delete storage objects: {}",
                failed.join(", ")
            )));
        }

        let removed = self.repository.remove_with_variants(image_id).await?;
        if !removed {
            // Raced with another teardown; objects are gone either way.
            tracing::warn!(image_id = %image_id, "Catalog row already removed");
        }

        tracing::info!(image_id = %image_id, "Teardown complete");
        Ok(())
    }
}
