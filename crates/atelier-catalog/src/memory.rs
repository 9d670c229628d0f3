//! In-memory catalog double for tests.
//!
//! Mirrors the Postgres repository's semantics (commit-once status guard,
//! transactional remove, newest-first ordering) without a database.

use async_trait::async_trait;
use atelier_core::models::{Image, ImageMetadata, ImageStatus, ImageVariant};
use atelier_core::AppError;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::repository::{ImageListFilter, ImageRepository, ImageUpdate};

/// In-memory image repository for testing without a database
#[derive(Clone, Default)]
pub struct InMemoryImageRepository {
    images: Arc<Mutex<HashMap<Uuid, Image>>>,
    variants: Arc<Mutex<HashMap<Uuid, Vec<ImageVariant>>>>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variant rows stored for an image.
    pub fn variant_count(&self, image_id: Uuid) -> usize {
        self.variants
            .lock()
            .unwrap()
            .get(&image_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn create(&self, image: &Image) -> Result<Image, AppError> {
        self.images
            .lock()
            .unwrap()
            .insert(image.id, image.clone());
        Ok(image.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Image>, AppError> {
        Ok(self.images.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, filter: &ImageListFilter) -> Result<Vec<Image>, AppError> {
        let images = self.images.lock().unwrap();
        let mut out: Vec<Image> = images
            .values()
            .filter(|i| {
                filter
                    .page_location
                    .as_ref()
                    .is_none_or(|loc| i.page_location.as_deref() == Some(loc.as_str()))
            })
            .filter(|i| filter.category.is_none_or(|c| i.category == c))
            .filter(|i| filter.status.is_none_or(|s| i.status == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn list_by_page_location(&self, page_location: &str) -> Result<Vec<Image>, AppError> {
        let images = self.images.lock().unwrap();
        let mut out: Vec<Image> = images
            .values()
            .filter(|i| i.page_location.as_deref() == Some(page_location))
            .filter(|i| i.status == ImageStatus::Active)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn update(&self, id: Uuid, update: ImageUpdate) -> Result<Option<Image>, AppError> {
        let mut images = self.images.lock().unwrap();
        let Some(image) = images.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            image.title = title;
        }
        if let Some(description) = update.description {
            image.description = Some(description);
        }
        if let Some(category) = update.category {
            image.category = category;
        }
        if let Some(tags) = update.tags {
            image.tags = tags;
        }
        if let Some(page_location) = update.page_location {
            image.page_location = Some(page_location);
        }
        if let Some(status) = update.status {
            image.status = status;
        }
        image.updated_at = Utc::now();

        Ok(Some(image.clone()))
    }

    async fn record_original(
        &self,
        id: Uuid,
        metadata: &ImageMetadata,
        original_locator: &str,
    ) -> Result<Option<Image>, AppError> {
        let mut images = self.images.lock().unwrap();
        let Some(image) = images.get_mut(&id) else {
            return Ok(None);
        };
        image.metadata = Some(metadata.clone());
        image.original_locator = Some(original_locator.to_string());
        image.updated_at = Utc::now();
        Ok(Some(image.clone()))
    }

    async fn mark_active(&self, id: Uuid) -> Result<Option<Image>, AppError> {
        let mut images = self.images.lock().unwrap();
        let Some(image) = images.get_mut(&id) else {
            return Ok(None);
        };
        if image.status != ImageStatus::Processing {
            return Ok(None);
        }
        image.status = ImageStatus::Active;
        image.updated_at = Utc::now();
        Ok(Some(image.clone()))
    }

    async fn mark_failed(&self, id: Uuid) -> Result<Option<Image>, AppError> {
        let mut images = self.images.lock().unwrap();
        let Some(image) = images.get_mut(&id) else {
            return Ok(None);
        };
        if image.status != ImageStatus::Processing {
            return Ok(None);
        }
        image.status = ImageStatus::Failed;
        image.updated_at = Utc::now();
        Ok(Some(image.clone()))
    }

    async fn insert_variants(&self, variants: &[ImageVariant]) -> Result<(), AppError> {
        let mut map = self.variants.lock().unwrap();
        for variant in variants {
            map.entry(variant.image_id)
                .or_default()
                .push(variant.clone());
        }
        Ok(())
    }

    async fn variants_of(&self, image_id: Uuid) -> Result<Vec<ImageVariant>, AppError> {
        Ok(self
            .variants
            .lock()
            .unwrap()
            .get(&image_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_with_variants(&self, id: Uuid) -> Result<bool, AppError> {
        self.variants.lock().unwrap().remove(&id);
        Ok(self.images.lock().unwrap().remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::{ImageCategory, VariantType};

    fn sample_image(page_location: Option<&str>) -> Image {
        Image::new(
            "photo.jpg".to_string(),
            "Photo".to_string(),
            None,
            ImageCategory::General,
            vec![],
            page_location.map(String::from),
            None,
        )
    }

    #[tokio::test]
    async fn test_status_commit_is_one_shot() {
        let repo = InMemoryImageRepository::new();
        let image = repo.create(&sample_image(None)).await.unwrap();

        let committed = repo.mark_active(image.id).await.unwrap().unwrap();
        assert_eq!(committed.status, ImageStatus::Active);

        // A second commit attempt must not touch the row.
        assert!(repo.mark_failed(image.id).await.unwrap().is_none());
        let found = repo.find(image.id).await.unwrap().unwrap();
        assert_eq!(found.status, ImageStatus::Active);
    }

    #[tokio::test]
    async fn test_list_by_page_location_active_only() {
        let repo = InMemoryImageRepository::new();

        let active = repo.create(&sample_image(Some("homepage"))).await.unwrap();
        repo.mark_active(active.id).await.unwrap();

        let processing = repo.create(&sample_image(Some("homepage"))).await.unwrap();
        let elsewhere = repo.create(&sample_image(Some("gallery"))).await.unwrap();
        repo.mark_active(elsewhere.id).await.unwrap();

        let listed = repo.list_by_page_location("homepage").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
        assert_ne!(listed[0].id, processing.id);
    }

    #[tokio::test]
    async fn test_remove_with_variants_clears_both() {
        let repo = InMemoryImageRepository::new();
        let image = repo.create(&sample_image(None)).await.unwrap();

        let variant = ImageVariant::new(
            image.id,
            VariantType::Thumbnail,
            "http://localhost/thumb.jpg".to_string(),
            150,
            150,
            1024,
            "jpeg".to_string(),
        );
        repo.insert_variants(&[variant]).await.unwrap();
        assert_eq!(repo.variant_count(image.id), 1);

        assert!(repo.remove_with_variants(image.id).await.unwrap());
        assert_eq!(repo.variant_count(image.id), 0);
        assert!(repo.find(image.id).await.unwrap().is_none());

        // Removing an absent row reports false instead of failing.
        assert!(!repo.remove_with_variants(image.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_leaves_unset_fields() {
        let repo = InMemoryImageRepository::new();
        let image = repo.create(&sample_image(Some("homepage"))).await.unwrap();

        let updated = repo
            .update(
                image.id,
                ImageUpdate {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.page_location.as_deref(), Some("homepage"));
        assert_eq!(updated.category, ImageCategory::General);
    }
}
