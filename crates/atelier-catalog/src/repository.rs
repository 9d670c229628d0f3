//! Catalog repository abstraction.
//!
//! The ingestion pipeline, teardown coordinator, and HTTP handlers all talk
//! to the catalog through this trait, so tests can swap in the in-memory
//! double from the `memory` module.

use async_trait::async_trait;
use atelier_core::models::{
    Image, ImageCategory, ImageMetadata, ImageStatus, ImageVariant,
};
use atelier_core::AppError;
use uuid::Uuid;

pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Filters for listing catalog entries. Unset fields match everything.
#[derive(Debug, Clone)]
pub struct ImageListFilter {
    pub page_location: Option<String>,
    pub category: Option<ImageCategory>,
    pub status: Option<ImageStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ImageListFilter {
    fn default() -> Self {
        Self {
            page_location: None,
            category: None,
            status: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

/// Partial update for the edit path. Unset fields are left unchanged.
///
/// `status` here is caller-requested archive/restore; the ingestion commit
/// goes through `mark_active`/`mark_failed` instead.
#[derive(Debug, Clone, Default)]
pub struct ImageUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ImageCategory>,
    pub tags: Option<Vec<String>>,
    pub page_location: Option<String>,
    pub status: Option<ImageStatus>,
}

/// Catalog repository for images and their variants.
///
/// Lifecycle contract: `create` inserts the row in `Processing` state before
/// any storage call happens; `record_original` attaches decoded metadata and
/// the original locator once the source object is durable; `mark_active` and
/// `mark_failed` commit the terminal status exactly once (both are guarded
/// on the row still being `Processing`); `remove_with_variants` is the only
/// way an image row leaves the catalog.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn create(&self, image: &Image) -> Result<Image, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Image>, AppError>;

    async fn list(&self, filter: &ImageListFilter) -> Result<Vec<Image>, AppError>;

    /// Active images for one page location, newest first.
    async fn list_by_page_location(&self, page_location: &str) -> Result<Vec<Image>, AppError>;

    async fn update(&self, id: Uuid, update: ImageUpdate) -> Result<Option<Image>, AppError>;

    /// Record decoded source metadata and the original object's locator.
    async fn record_original(
        &self,
        id: Uuid,
        metadata: &ImageMetadata,
        original_locator: &str,
    ) -> Result<Option<Image>, AppError>;

    /// Commit `Processing` → `Active`. Returns `None` when the row is absent
    /// or already committed.
    async fn mark_active(&self, id: Uuid) -> Result<Option<Image>, AppError>;

    /// Commit `Processing` → `Failed`. Returns `None` when the row is absent
    /// or already committed.
    async fn mark_failed(&self, id: Uuid) -> Result<Option<Image>, AppError>;

    /// Persist a batch of variant rows in one transaction.
    async fn insert_variants(&self, variants: &[ImageVariant]) -> Result<(), AppError>;

    async fn variants_of(&self, image_id: Uuid) -> Result<Vec<ImageVariant>, AppError>;

    /// Remove the image row and all of its variant rows in one transaction.
    /// Returns `false` when no row existed.
    async fn remove_with_variants(&self, id: Uuid) -> Result<bool, AppError>;
}
