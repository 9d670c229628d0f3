//! Route configuration.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use atelier_core::constants::MAX_UPLOAD_SIZE_BYTES;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

// Multipart framing overhead on top of the file cap.
const BODY_LIMIT_OVERHEAD: usize = 1024 * 1024;

pub fn setup_routes(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/images/upload",
            post(handlers::image_upload::upload_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES + BODY_LIMIT_OVERHEAD)),
        )
        .route("/api/images", get(handlers::image_get::list_images))
        .route(
            "/api/images/{id}",
            get(handlers::image_get::get_image)
                .patch(handlers::image_update::update_image)
                .delete(handlers::image_delete::delete_image),
        )
        .route(
            "/api/images/location/{page_location}",
            get(handlers::image_get::images_by_location),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
