//! Catalog persistence for images and their derived variants.
//!
//! The catalog is the source of truth for image lifecycle state: a row
//! exists in `Processing` before any storage call, is committed exactly once
//! to `Active` or `Failed`, and is only removed by the teardown path after
//! every storage object is gone.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryImageRepository;
pub use postgres::PostgresImageRepository;
pub use repository::{ImageListFilter, ImageRepository, ImageUpdate, DEFAULT_LIST_LIMIT};
