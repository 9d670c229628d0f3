//! Teardown integration tests.
//!
//! Run with: `cargo test -p atelier-api --test teardown_test`.

mod helpers;

use atelier_catalog::ImageRepository;
use atelier_core::AppError;
use helpers::fixtures::create_test_png;
use helpers::{sample_request, setup_harness};
use uuid::Uuid;

#[tokio::test]
async fn test_teardown_removes_objects_then_row() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(800, 600), "Doomed lot"))
        .await
        .expect("ingest");
    assert_eq!(harness.storage.object_count(), 11);

    harness
        .teardown
        .teardown(response.id)
        .await
        .expect("teardown");

    assert_eq!(harness.storage.object_count(), 0);
    assert!(harness
        .repository
        .find(response.id)
        .await
        .expect("find")
        .is_none());
    assert_eq!(harness.repository.variant_count(response.id), 0);
}

#[tokio::test]
async fn test_teardown_twice_reports_not_found() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(400, 300), "Once"))
        .await
        .expect("ingest");

    harness
        .teardown
        .teardown(response.id)
        .await
        .expect("first teardown");

    let second = harness.teardown.teardown(response.id).await;
    assert!(matches!(second, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_teardown_missing_image_is_not_found() {
    let harness = setup_harness();

    let result = harness.teardown.teardown(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_teardown_delete_failure_keeps_catalog_row() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(800, 600), "Sticky lot"))
        .await
        .expect("ingest");

    harness
        .storage
        .fail_deletes_containing("thumbnail/image.jpg");

    let result = harness.teardown.teardown(response.id).await;
    match result {
        Err(AppError::Storage(msg)) => {
            assert!(msg.contains("thumbnail/image.jpg"), "message: {}", msg);
        }
        other => panic!("expected storage error, got {:?}", other),
    }

    // Row and variants survive so a retry can finish the job.
    assert!(harness
        .repository
        .find(response.id)
        .await
        .expect("find")
        .is_some());
    assert!(harness.repository.variant_count(response.id) > 0);
}

#[tokio::test]
async fn test_teardown_retry_converges_after_failure() {
    let harness = setup_harness();

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(800, 600), "Retry lot"))
        .await
        .expect("ingest");

    harness.storage.fail_deletes_containing("image.webp");
    assert!(harness.teardown.teardown(response.id).await.is_err());

    // The earlier pass already removed the other objects; the retry only has
    // the webp keys left and deleting missing objects succeeds.
    harness.storage.clear_failures();
    harness
        .teardown
        .teardown(response.id)
        .await
        .expect("retry teardown");

    assert_eq!(harness.storage.object_count(), 0);
    assert!(harness
        .repository
        .find(response.id)
        .await
        .expect("find")
        .is_none());
}

#[tokio::test]
async fn test_teardown_cleans_partial_ingestion() {
    let harness = setup_harness();
    harness.storage.fail_puts_containing("image.webp");

    let response = harness
        .ingestion
        .ingest(sample_request(create_test_png(800, 600), "Partial lot"))
        .await
        .expect("ingest");
    assert_eq!(harness.storage.object_count(), 6);

    harness.storage.clear_failures();
    harness
        .teardown
        .teardown(response.id)
        .await
        .expect("teardown");

    // Planned keys that never got an object still delete cleanly.
    assert_eq!(harness.storage.object_count(), 0);
    assert!(harness
        .repository
        .find(response.id)
        .await
        .expect("find")
        .is_none());
}
