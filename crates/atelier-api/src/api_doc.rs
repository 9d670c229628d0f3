//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use atelier_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        version = "0.1.0",
        description = "Image ingestion and catalog API. Uploads are decoded, stored, and expanded into a fixed set of derived variants (five sizes in JPEG and WEBP) before the catalog entry commits."
    ),
    paths(
        handlers::image_upload::upload_image,
        handlers::image_get::get_image,
        handlers::image_get::list_images,
        handlers::image_get::images_by_location,
        handlers::image_update::update_image,
        handlers::image_delete::delete_image,
        handlers::health::health_check,
    ),
    components(schemas(
        models::Image,
        models::ImageVariant,
        models::ImageResponse,
        models::ImageMetadata,
        models::ImageStatus,
        models::ImageCategory,
        models::VariantType,
        handlers::image_update::UpdateImageRequest,
        error::ErrorResponse,
    )),
    tags(
        (name = "images", description = "Image ingestion and catalog operations"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
