//! Shared key generation for storage backends.
//!
//! Key format: `{image_id}/{variant_type}/{filename}` for derived variants,
//! `{image_id}/original/{original_filename}` for the source object. This
//! layout is a persisted contract; changing it breaks locator resolution for
//! previously stored images.

use atelier_core::models::VariantType;
use uuid::Uuid;

/// Generate the storage key for a derived variant object.
pub fn variant_key(image_id: Uuid, variant_type: VariantType, filename: &str) -> String {
    format!("{}/{}/{}", image_id, variant_type.as_str(), filename)
}

/// Generate the storage key for the unmodified source object.
pub fn original_key(image_id: Uuid, original_filename: &str) -> String {
    format!("{}/original/{}", image_id, original_filename)
}
