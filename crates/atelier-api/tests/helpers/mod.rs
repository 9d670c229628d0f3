//! Test helpers: in-memory catalog, recording storage double, fixtures.
//!
//! Run with: `cargo test -p atelier-api`.

pub mod fixtures;
pub mod storage;

use atelier_api::services::{IngestionRequest, IngestionService, TeardownService};
use atelier_catalog::InMemoryImageRepository;
use atelier_core::models::ImageCategory;
use std::sync::Arc;
use storage::RecordingBlobStore;

pub struct TestHarness {
    pub repository: Arc<InMemoryImageRepository>,
    pub storage: Arc<RecordingBlobStore>,
    pub ingestion: IngestionService,
    pub teardown: TeardownService,
}

pub fn setup_harness() -> TestHarness {
    let repository = Arc::new(InMemoryImageRepository::new());
    let storage = Arc::new(RecordingBlobStore::new());
    let ingestion = IngestionService::new(repository.clone(), storage.clone());
    let teardown = TeardownService::new(repository.clone(), storage.clone());
    TestHarness {
        repository,
        storage,
        ingestion,
        teardown,
    }
}

pub fn sample_request(data: Vec<u8>, title: &str) -> IngestionRequest {
    IngestionRequest {
        data,
        original_filename: "photo.png".to_string(),
        title: title.to_string(),
        description: None,
        category: ImageCategory::Auction,
        tags: vec!["estate".to_string()],
        page_location: Some("auctions/2024-spring".to_string()),
        uploaded_by: None,
    }
}
