use axum::{
    extract::{Extension, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use atelier_core::models::{ImageCategory, ImageResponse};
use atelier_core::AppError;
use std::sync::Arc;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::AuthenticatedUser;
use crate::services::IngestionRequest;
use crate::state::AppState;
use crate::validation::{sanitize_filename, validate_title, validate_upload};

/// Upload image handler.
///
/// Parses the multipart form, validates the file at the boundary, and hands
/// one [IngestionRequest] to the ingestion service. The response is the
/// committed catalog entry with all surviving variants.
#[utoipa::path(
    post,
    path = "/api/images/upload",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image ingested", body = ImageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Storage failure", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<AuthenticatedUser>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category = ImageCategory::default();
    let mut tags: Vec<String> = Vec::new();
    let mut page_location: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::InvalidInput(format!("Invalid multipart body: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(String::from)
                    .ok_or_else(|| AppError::InvalidInput("File field has no filename".to_string()))?;
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file field: {}", e))
                })?;
                file = Some((data.to_vec(), filename, content_type));
            }
            "title" => title = Some(text_field(field).await?),
            "description" => {
                let value = text_field(field).await?;
                if !value.trim().is_empty() {
                    description = Some(value);
                }
            }
            "category" => category = parse_category(&text_field(field).await?)?,
            "tags" => {
                tags = text_field(field)
                    .await?
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
            }
            "page_location" => {
                let value = text_field(field).await?;
                if !value.trim().is_empty() {
                    page_location = Some(value);
                }
            }
            _ => {}
        }
    }

    let (data, filename, content_type) =
        file.ok_or_else(|| AppError::InvalidInput("Missing file field".to_string()))?;
    let title =
        title.ok_or_else(|| AppError::InvalidInput("Missing title field".to_string()))?;

    validate_upload(&data, &content_type)?;
    validate_title(&title)?;
    let original_filename = sanitize_filename(&filename)?;

    let request = IngestionRequest {
        data,
        original_filename,
        title,
        description,
        category,
        tags,
        page_location,
        uploaded_by: user.map(|Extension(AuthenticatedUser(id))| id),
    };

    let response = state.ingestion.ingest(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read field '{}': {}", name, e)))
}

fn parse_category(value: &str) -> Result<ImageCategory, AppError> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|_| AppError::InvalidInput(format!("Unknown category '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_accepts_known_values() {
        assert_eq!(parse_category("auction").unwrap(), ImageCategory::Auction);
        assert_eq!(parse_category(" Property ").unwrap(), ImageCategory::Property);
        assert_eq!(parse_category("general").unwrap(), ImageCategory::General);
    }

    #[test]
    fn test_parse_category_rejects_unknown() {
        assert!(parse_category("vehicles").is_err());
        assert!(parse_category("").is_err());
    }
}
