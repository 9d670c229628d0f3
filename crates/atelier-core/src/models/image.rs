use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Image lifecycle status.
///
/// Status starts at `Processing` and is committed exactly once to `Active` or
/// `Failed` by the ingestion pipeline. `Active` may later move to `Archived`
/// (and back) through the edit path; `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "image_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Processing,
    Active,
    Archived,
    Failed,
}

impl ImageStatus {
    /// Whether a caller-requested status edit is allowed.
    ///
    /// Only archive/restore is caller-settable; `Processing` and `Failed`
    /// belong to the ingestion pipeline.
    pub fn editable_transition(self, next: ImageStatus) -> bool {
        matches!(
            (self, next),
            (ImageStatus::Active, ImageStatus::Archived)
                | (ImageStatus::Archived, ImageStatus::Active)
        )
    }
}

/// Image category enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "image_category", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    Auction,
    Property,
    Artwork,
    Furniture,
    Jewelry,
    Collectibles,
    #[default]
    General,
}

/// Variant type enum
///
/// `Webp` is a format axis rather than a size and co-exists with each size;
/// `Original` is the unmodified source object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "variant_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum VariantType {
    Thumbnail,
    Small,
    Medium,
    Large,
    Full,
    Webp,
    Original,
}

impl VariantType {
    /// Lowercase name used in storage keys. Keys are a persisted contract;
    /// changing these strings breaks locator resolution for stored images.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Thumbnail => "thumbnail",
            VariantType::Small => "small",
            VariantType::Medium => "medium",
            VariantType::Large => "large",
            VariantType::Full => "full",
            VariantType::Webp => "webp",
            VariantType::Original => "original",
        }
    }
}

impl std::fmt::Display for VariantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source metadata extracted from a decoded original (stored as JSONB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageMetadata {
    pub width: i32,
    pub height: i32,
    pub format: String,
    pub size: i64,
    #[serde(rename = "colorSpace", skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
}

/// One logical uploaded asset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Image {
    pub id: Uuid,
    pub original_filename: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ImageCategory,
    pub metadata: Option<ImageMetadata>,
    pub original_locator: Option<String>,
    pub status: ImageStatus,
    pub tags: Vec<String>,
    pub page_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub uploaded_by: Option<Uuid>,
}

impl Image {
    /// Build a fresh catalog entry in `Processing` state.
    ///
    /// `metadata` and `original_locator` stay empty until the original has
    /// been decoded and uploaded.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        original_filename: String,
        title: String,
        description: Option<String>,
        category: ImageCategory,
        tags: Vec<String>,
        page_location: Option<String>,
        uploaded_by: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            original_filename,
            title,
            description,
            category,
            metadata: None,
            original_locator: None,
            status: ImageStatus::Processing,
            tags,
            page_location,
            created_at: now,
            updated_at: now,
            uploaded_by,
        }
    }
}

/// One derived artifact owned by an [`Image`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageVariant {
    pub id: Uuid,
    pub image_id: Uuid,
    pub variant_type: VariantType,
    pub storage_locator: String,
    pub width: i32,
    pub height: i32,
    pub byte_size: i64,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

impl ImageVariant {
    pub fn new(
        image_id: Uuid,
        variant_type: VariantType,
        storage_locator: String,
        width: i32,
        height: i32,
        byte_size: i64,
        format: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_id,
            variant_type,
            storage_locator,
            width,
            height,
            byte_size,
            format,
            created_at: Utc::now(),
        }
    }
}

/// API response shape: the image plus all of its variants.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub original_filename: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ImageCategory,
    pub metadata: Option<ImageMetadata>,
    pub original_locator: Option<String>,
    pub status: ImageStatus,
    pub tags: Vec<String>,
    pub page_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub uploaded_by: Option<Uuid>,
    pub variants: Vec<ImageVariant>,
}

impl ImageResponse {
    pub fn from_parts(image: Image, variants: Vec<ImageVariant>) -> Self {
        Self {
            id: image.id,
            original_filename: image.original_filename,
            title: image.title,
            description: image.description,
            category: image.category,
            metadata: image.metadata,
            original_locator: image.original_locator,
            status: image.status,
            tags: image.tags,
            page_location: image.page_location,
            created_at: image.created_at,
            updated_at: image.updated_at,
            uploaded_by: image.uploaded_by,
            variants,
        }
    }
}
