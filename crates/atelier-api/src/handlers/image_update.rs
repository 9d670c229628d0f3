use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use atelier_catalog::ImageUpdate;
use atelier_core::models::{ImageCategory, ImageResponse, ImageStatus};
use atelier_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::validation::validate_title;

/// Partial edit of catalog metadata. Absent fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateImageRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub category: Option<ImageCategory>,
    pub tags: Option<Vec<String>>,
    pub page_location: Option<String>,
    pub status: Option<ImageStatus>,
}

#[utoipa::path(
    patch,
    path = "/api/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Image updated", body = ImageResponse),
        (status = 400, description = "Invalid input or status transition", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(image_id = %id, operation = "update_image")
)]
pub async fn update_image(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdateImageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let current = state
        .repository
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    request.validate().map_err(AppError::from)?;
    if let Some(title) = &request.title {
        validate_title(title)?;
    }

    // Only archive/restore is caller-settable; ingestion owns the rest.
    if let Some(next) = request.status {
        if !current.status.editable_transition(next) {
            return Err(HttpAppError(AppError::BadRequest(format!(
                "Status transition {:?} -> {:?} is not allowed",
                current.status, next
            ))));
        }
    }

    let update = ImageUpdate {
        title: request.title,
        description: request.description,
        category: request.category,
        tags: request.tags,
        page_location: request.page_location,
        status: request.status,
    };

    let updated = state
        .repository
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
    let variants = state.repository.variants_of(id).await?;

    Ok(Json(ImageResponse::from_parts(updated, variants)))
}
