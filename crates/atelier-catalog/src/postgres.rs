//! Postgres-backed catalog repository.

use async_trait::async_trait;
use atelier_core::models::{
    Image, ImageCategory, ImageMetadata, ImageStatus, ImageVariant, VariantType,
};
use atelier_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::repository::{ImageListFilter, ImageRepository, ImageUpdate};

/// Raw `images` row. `metadata` stays JSONB here and is parsed into
/// [`ImageMetadata`] when converting to the domain model.
#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    original_filename: String,
    title: String,
    description: Option<String>,
    category: ImageCategory,
    metadata: Option<sqlx::types::JsonValue>,
    original_locator: Option<String>,
    status: ImageStatus,
    tags: Vec<String>,
    page_location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    uploaded_by: Option<Uuid>,
}

impl ImageRow {
    fn into_image(self) -> Result<Image, AppError> {
        let metadata: Option<ImageMetadata> = match self.metadata {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };

        Ok(Image {
            id: self.id,
            original_filename: self.original_filename,
            title: self.title,
            description: self.description,
            category: self.category,
            metadata,
            original_locator: self.original_locator,
            status: self.status,
            tags: self.tags,
            page_location: self.page_location,
            created_at: self.created_at,
            updated_at: self.updated_at,
            uploaded_by: self.uploaded_by,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: Uuid,
    image_id: Uuid,
    variant_type: VariantType,
    storage_locator: String,
    width: i32,
    height: i32,
    byte_size: i64,
    format: String,
    created_at: DateTime<Utc>,
}

impl VariantRow {
    fn into_variant(self) -> ImageVariant {
        ImageVariant {
            id: self.id,
            image_id: self.image_id,
            variant_type: self.variant_type,
            storage_locator: self.storage_locator,
            width: self.width,
            height: self.height,
            byte_size: self.byte_size,
            format: self.format,
            created_at: self.created_at,
        }
    }
}

fn rows_to_images(rows: Vec<ImageRow>) -> Result<Vec<Image>, AppError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(row.into_image()?);
    }
    Ok(out)
}

/// Postgres image repository
#[derive(Clone)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    #[tracing::instrument(skip(self, image), fields(db.table = "images", db.operation = "insert", db.record_id = %image.id))]
    async fn create(&self, image: &Image) -> Result<Image, AppError> {
        let metadata = image
            .metadata
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row: ImageRow = sqlx::query_as::<Postgres, ImageRow>(
            r#"
            INSERT INTO images (
                id, original_filename, title, description, category,
                metadata, original_locator, status, tags, page_location,
                created_at, updated_at, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(image.id)
        .bind(&image.original_filename)
        .bind(&image.title)
        .bind(&image.description)
        .bind(image.category)
        .bind(metadata)
        .bind(&image.original_locator)
        .bind(image.status)
        .bind(&image.tags)
        .bind(&image.page_location)
        .bind(image.created_at)
        .bind(image.updated_at)
        .bind(image.uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        row.into_image()
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select", db.record_id = %id))]
    async fn find(&self, id: Uuid) -> Result<Option<Image>, AppError> {
        let row: Option<ImageRow> =
            sqlx::query_as::<Postgres, ImageRow>("SELECT * FROM images WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(ImageRow::into_image).transpose()
    }

    #[tracing::instrument(skip(self, filter), fields(db.table = "images", db.operation = "select"))]
    async fn list(&self, filter: &ImageListFilter) -> Result<Vec<Image>, AppError> {
        let rows: Vec<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(
            r#"
            SELECT * FROM images
            WHERE ($1::text IS NULL OR page_location = $1)
              AND ($2::image_category IS NULL OR category = $2)
              AND ($3::image_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&filter.page_location)
        .bind(filter.category)
        .bind(filter.status)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        rows_to_images(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select"))]
    async fn list_by_page_location(&self, page_location: &str) -> Result<Vec<Image>, AppError> {
        let rows: Vec<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(
            "SELECT * FROM images WHERE page_location = $1 AND status = 'active' ORDER BY created_at DESC",
        )
        .bind(page_location)
        .fetch_all(&self.pool)
        .await?;

        rows_to_images(rows)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "images", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: Uuid, update: ImageUpdate) -> Result<Option<Image>, AppError> {
        let row: Option<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(
            r#"
            UPDATE images
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                tags = COALESCE($5, tags),
                page_location = COALESCE($6, page_location),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.category)
        .bind(update.tags)
        .bind(update.page_location)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImageRow::into_image).transpose()
    }

    #[tracing::instrument(skip(self, metadata), fields(db.table = "images", db.operation = "update", db.record_id = %id))]
    async fn record_original(
        &self,
        id: Uuid,
        metadata: &ImageMetadata,
        original_locator: &str,
    ) -> Result<Option<Image>, AppError> {
        let metadata = serde_json::to_value(metadata)?;

        let row: Option<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(
            r#"
            UPDATE images
            SET metadata = $2, original_locator = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(metadata)
        .bind(original_locator)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImageRow::into_image).transpose()
    }

    // The status guard enforces the commit-once rule: a row that already left
    // Processing is never re-committed.
    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "update", db.record_id = %id))]
    async fn mark_active(&self, id: Uuid) -> Result<Option<Image>, AppError> {
        let row: Option<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(
            "UPDATE images SET status = 'active', updated_at = NOW() WHERE id = $1 AND status = 'processing' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImageRow::into_image).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "update", db.record_id = %id))]
    async fn mark_failed(&self, id: Uuid) -> Result<Option<Image>, AppError> {
        let row: Option<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(
            "UPDATE images SET status = 'failed', updated_at = NOW() WHERE id = $1 AND status = 'processing' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImageRow::into_image).transpose()
    }

    #[tracing::instrument(skip(self, variants), fields(db.table = "image_variants", db.operation = "insert", count = variants.len()))]
    async fn insert_variants(&self, variants: &[ImageVariant]) -> Result<(), AppError> {
        if variants.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for variant in variants {
            sqlx::query(
                r#"
                INSERT INTO image_variants (
                    id, image_id, variant_type, storage_locator,
                    width, height, byte_size, format, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(variant.id)
            .bind(variant.image_id)
            .bind(variant.variant_type)
            .bind(&variant.storage_locator)
            .bind(variant.width)
            .bind(variant.height)
            .bind(variant.byte_size)
            .bind(&variant.format)
            .bind(variant.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "image_variants", db.operation = "select", db.record_id = %image_id))]
    async fn variants_of(&self, image_id: Uuid) -> Result<Vec<ImageVariant>, AppError> {
        let rows: Vec<VariantRow> = sqlx::query_as::<Postgres, VariantRow>(
            "SELECT * FROM image_variants WHERE image_id = $1 ORDER BY created_at ASC",
        )
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VariantRow::into_variant).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "delete", db.record_id = %id))]
    async fn remove_with_variants(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM image_variants WHERE image_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let rows_affected = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(rows_affected > 0)
    }
}
