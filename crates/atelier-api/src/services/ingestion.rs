//! Ingestion pipeline: one upload in, one committed catalog entry out.
//!
//! Order of operations is load-bearing. The catalog row exists before any
//! storage call; the original object is uploaded and recorded before derived
//! work starts; surviving derived variants are persisted in one batch; the
//! status is committed exactly once to `Active` or `Failed`. A failed decode
//! or original upload is a hard failure. A failed derived variant is logged
//! and excluded, and the image still commits `Active`.

use atelier_catalog::ImageRepository;
use atelier_core::constants::VARIANT_CONCURRENCY;
use atelier_core::models::{Image, ImageCategory, ImageResponse, ImageVariant, VariantType};
use atelier_core::AppError;
use atelier_processing::{DecodedSource, VariantGenerator, VariantPlanner, VariantSpec};
use atelier_storage::keys::{original_key, variant_key};
use atelier_storage::BlobStore;
use futures::stream::{self, StreamExt};
use image::DynamicImage;
use std::sync::Arc;
use uuid::Uuid;

/// Everything the pipeline needs from one upload request.
#[derive(Debug)]
pub struct IngestionRequest {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ImageCategory,
    pub tags: Vec<String>,
    pub page_location: Option<String>,
    pub uploaded_by: Option<Uuid>,
}

#[derive(Clone)]
pub struct IngestionService {
    repository: Arc<dyn ImageRepository>,
    storage: Arc<dyn BlobStore>,
}

impl IngestionService {
    pub fn new(repository: Arc<dyn ImageRepository>, storage: Arc<dyn BlobStore>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Run one ingestion to a terminal status and return the committed image.
    ///
    /// Returns `Err` only for failures the caller can act on: decode
    /// (`InvalidSource`), original upload (`Storage`), or catalog access
    /// (`Catalog`). The returned image's status is `Active` even when some
    /// derived variants were dropped.
    #[tracing::instrument(
        skip(self, request),
        fields(filename = %request.original_filename, operation = "ingest")
    )]
    pub async fn ingest(&self, request: IngestionRequest) -> Result<ImageResponse, AppError> {
        let image = Image::new(
            request.original_filename,
            request.title,
            request.description,
            request.category,
            request.tags,
            request.page_location,
            request.uploaded_by,
        );
        let image = self.repository.create(&image).await?;
        tracing::info!(image_id = %image.id, "Catalog entry created, starting pipeline");

        let repository = self.repository.clone();
        let storage = self.storage.clone();
        // The pipeline runs detached so a dropped request cannot strand a
        // Processing row; it always reaches Active or Failed.
        tokio::spawn(run_pipeline(repository, storage, image, request.data))
            .await
            .map_err(|e| AppError::Internal(format!("Ingestion task failed: {}", e)))?
    }
}

async fn run_pipeline(
    repository: Arc<dyn ImageRepository>,
    storage: Arc<dyn BlobStore>,
    image: Image,
    data: Vec<u8>,
) -> Result<ImageResponse, AppError> {
    let image_id = image.id;

    let decoded = match DecodedSource::decode(data.clone()).await {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(error = %e, image_id = %image_id, "Source decode failed");
            mark_failed(&repository, image_id).await;
            return Err(e);
        }
    };

    let key = original_key(image_id, &image.original_filename);
    let original_locator = match storage
        .put(&key, source_content_type(&decoded.format), data)
        .await
    {
        Ok(locator) => locator,
        Err(e) => {
            tracing::error!(error = %e, image_id = %image_id, key = %key, "Original upload failed");
            mark_failed(&repository, image_id).await;
            return Err(AppError::Storage(format!("Original upload failed: {}", e)));
        }
    };

    let metadata = decoded.metadata();
    match repository
        .record_original(image_id, &metadata, &original_locator)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(AppError::Internal(format!(
                "Image {} disappeared while recording original",
                image_id
            )));
        }
        Err(e) => {
            mark_failed(&repository, image_id).await;
            return Err(e);
        }
    }

    // The original row goes in before derived work starts; its object is
    // durable, and derived variants only ever add to an already-usable image.
    let original_variant = ImageVariant::new(
        image_id,
        VariantType::Original,
        original_locator,
        decoded.width,
        decoded.height,
        decoded.byte_size,
        decoded.format.clone(),
    );
    if let Err(e) = repository
        .insert_variants(std::slice::from_ref(&original_variant))
        .await
    {
        mark_failed(&repository, image_id).await;
        return Err(e);
    }

    let source = Arc::new(decoded.image);
    let derived: Vec<ImageVariant> = stream::iter(VariantPlanner::plan())
        .map(|spec| realize_variant(storage.clone(), source.clone(), image_id, spec))
        .buffer_unordered(VARIANT_CONCURRENCY)
        .filter_map(|v| async { v })
        .collect()
        .await;

    if let Err(e) = repository.insert_variants(&derived).await {
        mark_failed(&repository, image_id).await;
        return Err(e);
    }

    let mut variants = vec![original_variant];
    variants.extend(derived);

    let committed = repository
        .mark_active(image_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Image {} left Processing before commit", image_id))
        })?;

    tracing::info!(
        image_id = %image_id,
        variant_count = variants.len(),
        "Ingestion committed"
    );
    Ok(ImageResponse::from_parts(committed, variants))
}

/// Generate, upload, and build the row for one derived spec. Failures are
/// soft: logged and turned into `None` so siblings and the commit proceed.
async fn realize_variant(
    storage: Arc<dyn BlobStore>,
    source: Arc<DynamicImage>,
    image_id: Uuid,
    spec: VariantSpec,
) -> Option<ImageVariant> {
    let generated = match VariantGenerator::generate(source, spec).await {
        Ok(generated) => generated,
        Err(e) => {
            tracing::warn!(
                error = %e,
                image_id = %image_id,
                variant = %spec.label(),
                "Variant generation failed, skipping"
            );
            return None;
        }
    };

    let key = variant_key(image_id, spec.size, spec.format.filename());
    match storage
        .put(&key, spec.format.content_type(), generated.data.to_vec())
        .await
    {
        Ok(locator) => Some(ImageVariant::new(
            image_id,
            spec.row_type(),
            locator,
            generated.width,
            generated.height,
            generated.byte_size,
            spec.format.as_str().to_string(),
        )),
        Err(e) => {
            tracing::warn!(
                error = %e,
                image_id = %image_id,
                variant = %spec.label(),
                key = %key,
                "Variant upload failed, skipping"
            );
            None
        }
    }
}

/// Commit `Failed`. Best effort: the pipeline is already surfacing the
/// primary error, so commit problems are only logged.
async fn mark_failed(repository: &Arc<dyn ImageRepository>, image_id: Uuid) {
    match repository.mark_failed(image_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(image_id = %image_id, "Failed commit skipped, row absent or already terminal")
        }
        Err(e) => tracing::error!(error = %e, image_id = %image_id, "Could not mark image failed"),
    }
}

fn source_content_type(format: &str) -> &'static str {
    match format {
        "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
