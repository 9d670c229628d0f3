//! HTTP handlers. Parse and validate the request, call a service or the
//! repository, shape the response. Lifecycle logic lives in [crate::services].

pub mod health;
pub mod image_delete;
pub mod image_get;
pub mod image_update;
pub mod image_upload;

use uuid::Uuid;

/// Identity attached by the upstream auth layer as a request extension.
/// Absent on anonymous uploads.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);
