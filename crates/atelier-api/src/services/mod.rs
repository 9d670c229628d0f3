//! Image lifecycle services.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

pub mod ingestion;
pub mod teardown;

pub use ingestion::{IngestionRequest, IngestionService};
pub use teardown::TeardownService;
