//! Application state shared by every handler.

use atelier_catalog::ImageRepository;
use atelier_core::Config;
use atelier_storage::BlobStore;
use std::sync::Arc;

use crate::services::{IngestionService, TeardownService};

/// Main application state: repository and storage handles plus the lifecycle
/// services built on top of them.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ImageRepository>,
    pub storage: Arc<dyn BlobStore>,
    pub ingestion: IngestionService,
    pub teardown: TeardownService,
    pub config: Config,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn ImageRepository>,
        storage: Arc<dyn BlobStore>,
        config: Config,
    ) -> Self {
        Self {
            ingestion: IngestionService::new(repository.clone(), storage.clone()),
            teardown: TeardownService::new(repository.clone(), storage.clone()),
            repository,
            storage,
            config,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
