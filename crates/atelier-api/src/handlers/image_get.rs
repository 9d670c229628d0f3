use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use atelier_catalog::{ImageListFilter, DEFAULT_LIST_LIMIT};
use atelier_core::models::{ImageCategory, ImageResponse, ImageStatus};
use atelier_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image found", body = ImageResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(image_id = %id, operation = "get_image"))]
pub async fn get_image(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = state
        .repository
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
    let variants = state.repository.variants_of(id).await?;
    Ok(Json(ImageResponse::from_parts(image, variants)))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    #[serde(default)]
    pub page_location: Option<String>,
    #[serde(default)]
    pub category: Option<ImageCategory>,
    #[serde(default)]
    pub status: Option<ImageStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

#[utoipa::path(
    get,
    path = "/api/images",
    tag = "images",
    params(
        ListQuery
    ),
    responses(
        (status = 200, description = "List of images", body = Vec<ImageResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, query),
    fields(
        limit = query.limit,
        offset = query.offset,
        page_location = ?query.page_location,
        operation = "list_images"
    )
)]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = ImageListFilter {
        page_location: query.page_location,
        category: query.category,
        status: query.status,
        limit: query.limit.clamp(1, 100),
        offset: query.offset.max(0),
    };

    let images = state.repository.list(&filter).await?;

    let mut responses = Vec::with_capacity(images.len());
    for image in images {
        let variants = state.repository.variants_of(image.id).await?;
        responses.push(ImageResponse::from_parts(image, variants));
    }

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/images/location/{page_location}",
    tag = "images",
    params(
        ("page_location" = String, Path, description = "Page location slug")
    ),
    responses(
        (status = 200, description = "Active images for the location", body = Vec<ImageResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(page_location = %page_location, operation = "images_by_location")
)]
pub async fn images_by_location(
    Path(page_location): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let images = state
        .repository
        .list_by_page_location(&page_location)
        .await?;

    let mut responses = Vec::with_capacity(images.len());
    for image in images {
        let variants = state.repository.variants_of(image.id).await?;
        responses.push(ImageResponse::from_parts(image, variants));
    }

    Ok(Json(responses))
}
