//! Ingestion pipeline integration tests.
//!
//! Run with: `cargo test -p atelier-api --test ingestion_test`.

mod helpers;

use atelier_catalog::{ImageListFilter, ImageRepository};
use atelier_core::models::{ImageStatus, VariantType};
use atelier_core::AppError;
use helpers::fixtures::create_test_png;
use helpers::{sample_request, setup_harness};

#[tokio::test]
async fn test_ingest_commits_active_with_full_variant_set() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(2000, 1000), "Lot 12"))
        .await
        .expect("ingest");

    assert_eq!(response.status, ImageStatus::Active);
    assert_eq!(response.variants.len(), 11);

    let original = response
        .variants
        .iter()
        .find(|v| v.variant_type == VariantType::Original)
        .expect("original row");
    assert_eq!((original.width, original.height), (2000, 1000));
    assert_eq!(original.format, "png");

    let webp_rows = response
        .variants
        .iter()
        .filter(|v| v.variant_type == VariantType::Webp)
        .count();
    assert_eq!(webp_rows, 5);

    let thumbnail = response
        .variants
        .iter()
        .find(|v| v.variant_type == VariantType::Thumbnail)
        .expect("thumbnail row");
    assert_eq!((thumbnail.width, thumbnail.height), (150, 75));
    assert_eq!(thumbnail.format, "jpeg");

    let keys = harness.storage.put_keys();
    assert_eq!(keys.len(), 11);
    let id = response.id;
    assert!(keys.contains(&format!("{}/original/photo.png", id)));
    assert!(keys.contains(&format!("{}/thumbnail/image.jpg", id)));
    assert!(keys.contains(&format!("{}/thumbnail/image.webp", id)));
    assert!(keys.contains(&format!("{}/full/image.jpg", id)));
}

#[tokio::test]
async fn test_ingest_never_upscales_small_source() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(100, 80), "Small lot"))
        .await
        .expect("ingest");

    assert_eq!(response.status, ImageStatus::Active);
    for variant in &response.variants {
        assert_eq!((variant.width, variant.height), (100, 80));
    }
}

#[tokio::test]
async fn test_ingest_invalid_source_fails_without_storage_calls() {
    let harness = setup_harness();

    let result = harness
        .ingestion
        .ingest(sample_request(b"not an image at all".to_vec(), "Broken"))
        .await;

    assert!(matches!(result, Err(AppError::InvalidSource(_))));
    assert_eq!(harness.storage.put_keys().len(), 0);

    let images = harness
        .repository
        .list(&ImageListFilter::default())
        .await
        .expect("list");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].status, ImageStatus::Failed);
    assert_eq!(harness.repository.variant_count(images[0].id), 0);
}

#[tokio::test]
async fn test_ingest_original_upload_failure_commits_failed() {
    let harness = setup_harness();
    harness.storage.fail_puts_containing("/original/");

    let result = harness
        .ingestion
        .ingest(sample_request(create_test_png(400, 400), "Doomed"))
        .await;

    assert!(matches!(result, Err(AppError::Storage(_))));

    let images = harness
        .repository
        .list(&ImageListFilter::default())
        .await
        .expect("list");
    assert_eq!(images[0].status, ImageStatus::Failed);
    assert_eq!(harness.repository.variant_count(images[0].id), 0);
}

#[tokio::test]
async fn test_ingest_derived_failures_still_commit_active() {
    let harness = setup_harness();
    harness.storage.fail_puts_containing("image.webp");

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(800, 600), "Partial"))
        .await
        .expect("ingest");

    assert_eq!(response.status, ImageStatus::Active);
    // Original plus the five JPEG sizes survive; webp uploads all failed.
    assert_eq!(response.variants.len(), 6);
    assert!(response
        .variants
        .iter()
        .all(|v| v.variant_type != VariantType::Webp));
}

#[tokio::test]
async fn test_ingest_all_derived_failures_still_commit_active() {
    let harness = setup_harness();
    // Both derived filenames fail; only the original key goes through.
    harness.storage.fail_puts_containing("image.jpg");
    harness.storage.fail_puts_containing("image.webp");

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(800, 600), "Original only"))
        .await
        .expect("ingest");

    assert_eq!(response.status, ImageStatus::Active);
    assert_eq!(response.variants.len(), 1);
    assert_eq!(response.variants[0].variant_type, VariantType::Original);
    assert_eq!(harness.repository.variant_count(response.id), 1);
    assert_eq!(harness.storage.put_keys().len(), 1);
}

#[tokio::test]
async fn test_ingest_derived_variants_have_bytes_and_known_formats() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(2000, 1000), "Lot 12"))
        .await
        .expect("ingest");

    let derived: Vec<_> = response
        .variants
        .iter()
        .filter(|v| v.variant_type != VariantType::Original)
        .collect();
    assert_eq!(derived.len(), 10);
    for variant in derived {
        assert!(variant.byte_size > 0, "variant {} is empty", variant.id);
        assert!(matches!(variant.format.as_str(), "jpeg" | "webp"));
    }
}

#[tokio::test]
async fn test_ingest_records_original_metadata() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(640, 480), "Metadata"))
        .await
        .expect("ingest");

    let stored = harness
        .repository
        .find(response.id)
        .await
        .expect("find")
        .expect("row");
    let metadata = stored.metadata.expect("metadata recorded");
    assert_eq!((metadata.width, metadata.height), (640, 480));
    assert_eq!(metadata.format, "png");
    assert!(metadata.size > 0);
    assert!(stored.original_locator.is_some());
}
