//! Atelier Storage Library
//!
//! This crate provides the blob store abstraction and its backends: an
//! S3-compatible client, a managed object-storage platform client, and a
//! local filesystem backend for development and tests.
//!
//! # Storage key format
//!
//! All backends share one key layout. The layout is a persisted
//! contract: locators for previously stored images resolve through it.
//!
//! - **Derived variants**: `{image_id}/{variant_type}/{filename}`
//! - **Original**: `{image_id}/original/{original_filename}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-managed")]
pub mod managed;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use atelier_core::StorageBackend;
pub use factory::create_blob_store;
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
#[cfg(feature = "storage-managed")]
pub use managed::ManagedBlobStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use traits::{BlobStore, StorageError, StorageResult};
