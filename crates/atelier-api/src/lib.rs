//! Atelier API
//!
//! HTTP boundary for the image ingestion pipeline: handlers, application
//! state, and setup. The ingestion and teardown services in [services] hold
//! the lifecycle logic; handlers stay thin.

mod api_doc;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{IngestionRequest, IngestionService, TeardownService};
pub use state::AppState;
