use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/api/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 502, description = "Storage deletion failed, catalog row kept", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(image_id = %id, operation = "delete_image"))]
pub async fn delete_image(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.teardown.teardown(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
