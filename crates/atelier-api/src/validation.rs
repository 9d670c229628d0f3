//! Upload boundary validation: size cap, content-type allowlist, filename
//! sanitization. Runs before the ingestion core so rejected uploads never
//! create catalog rows or storage objects.

use atelier_core::constants::{
    ALLOWED_IMAGE_CONTENT_TYPES, ALLOWED_IMAGE_EXTENSIONS, MAX_UPLOAD_SIZE_BYTES,
};
use atelier_core::AppError;

pub fn validate_upload(data: &[u8], content_type: &str) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if data.len() > MAX_UPLOAD_SIZE_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "{} bytes exceeds max {} bytes",
            data.len(),
            MAX_UPLOAD_SIZE_BYTES
        )));
    }
    if !ALLOWED_IMAGE_CONTENT_TYPES.contains(&content_type) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type '{}', allowed: {:?}",
            content_type, ALLOWED_IMAGE_CONTENT_TYPES
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Title must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Reduce a client-supplied filename to a safe storage-key segment.
///
/// Filenames feed directly into storage keys, so path separators and
/// non-portable characters are stripped here rather than trusted downstream.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.' || c == '_') {
        return Err(AppError::InvalidInput(format!(
            "Invalid filename: {}",
            filename
        )));
    }

    let Some((_, extension)) = cleaned.rsplit_once('.') else {
        return Err(AppError::InvalidInput(format!(
            "Missing file extension (filename: {})",
            filename
        )));
    };
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid extension '{}', allowed: {:?}",
            extension, ALLOWED_IMAGE_EXTENSIONS
        )));
    }

    Ok(cleaned)
}
