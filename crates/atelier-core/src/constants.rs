//! Shared constants.

/// Maximum accepted upload size in bytes (10 MB).
pub const MAX_UPLOAD_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for image uploads.
pub const ALLOWED_IMAGE_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// File extensions accepted for image uploads.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Cache-Control header applied to stored objects.
pub const OBJECT_CACHE_CONTROL: &str = "max-age=31536000";

/// Upper bound on concurrent variant generate+upload tasks per ingestion.
pub const VARIANT_CONCURRENCY: usize = 4;
