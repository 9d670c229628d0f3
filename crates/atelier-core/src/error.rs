//! Unified error taxonomy.
//!
//! Every fallible operation in the workspace surfaces an [`AppError`]. The
//! variants distinguish who is at fault (caller, storage backend, catalog,
//! codec) so the HTTP layer can map each one to a status code and log level
//! without inspecting message text.
//!
//! The `Catalog` variant wraps `sqlx::Error` and is gated behind the `sqlx`
//! feature; with `default-features = false` it degrades to a plain string so
//! non-database consumers avoid the sqlx dependency.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Severity at which an error should be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected caller mistakes (validation, unknown ids).
    Debug,
    /// Degraded but handled conditions.
    Warn,
    /// Unexpected failures needing operator attention.
    Error,
}

/// How an error presents itself at the HTTP boundary.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable machine-readable code, e.g. `"STORAGE_ERROR"`.
    fn error_code(&self) -> &'static str;

    /// True when retrying the same request may succeed.
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show callers; may omit internal detail.
    fn client_message(&self) -> String;

    /// True when internals must be hidden in production responses.
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("catalog failure: {0}")]
    Catalog(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("catalog failure: {0}")]
    Catalog(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("source image rejected: {0}")]
    InvalidSource(String),

    #[error("encoding the {variant} variant failed: {reason}")]
    Encode { variant: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("internal failure: {0}")]
    Internal(String),

    #[error("internal failure: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Catalog(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("io failure: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("malformed JSON: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("malformed UUID: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("validation failed: {}", err))
    }
}

/// Per-variant presentation profile; `client_message` stays on the impl
/// because it carries dynamic content.
struct ErrorProfile {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

impl AppError {
    fn profile(&self) -> ErrorProfile {
        match self {
            AppError::Catalog(_) => ErrorProfile {
                status: 503,
                code: "CATALOG_ERROR",
                recoverable: true,
                action: Some("Retry the request shortly"),
                sensitive: true,
                level: LogLevel::Error,
            },
            AppError::Storage(_) => ErrorProfile {
                status: 502,
                code: "STORAGE_ERROR",
                recoverable: true,
                action: Some("Retry the request shortly"),
                sensitive: true,
                level: LogLevel::Error,
            },
            AppError::InvalidSource(_) => ErrorProfile {
                status: 400,
                code: "INVALID_SOURCE",
                recoverable: false,
                action: Some("Upload a decodable image file"),
                sensitive: false,
                level: LogLevel::Warn,
            },
            AppError::Encode { .. } => ErrorProfile {
                status: 500,
                code: "ENCODE_ERROR",
                recoverable: true,
                action: Some("Retry the operation"),
                sensitive: true,
                level: LogLevel::Warn,
            },
            AppError::NotFound(_) => ErrorProfile {
                status: 404,
                code: "NOT_FOUND",
                recoverable: false,
                action: Some("Check that the requested id exists"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::InvalidInput(_) => ErrorProfile {
                status: 400,
                code: "INVALID_INPUT",
                recoverable: false,
                action: Some("Correct the request parameters"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::BadRequest(_) => ErrorProfile {
                status: 400,
                code: "BAD_REQUEST",
                recoverable: false,
                action: Some("Correct the request and resend"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::PayloadTooLarge(_) => ErrorProfile {
                status: 413,
                code: "PAYLOAD_TOO_LARGE",
                recoverable: false,
                action: Some("Upload a smaller file"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::Internal(_) | AppError::InternalWithSource { .. } => ErrorProfile {
                status: 500,
                code: "INTERNAL_ERROR",
                recoverable: true,
                action: Some("Retry the request shortly"),
                sensitive: true,
                level: LogLevel::Error,
            },
        }
    }

    /// Variant name for detailed error responses.
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Catalog(_) => "Catalog",
            AppError::Storage(_) => "Storage",
            AppError::InvalidSource(_) => "InvalidSource",
            AppError::Encode { .. } => "Encode",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Message plus the source chain, capped at five levels.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut chain = vec![self.to_string()];
        let mut source = self.source();
        while let Some(err) = source {
            if chain.len() > 5 {
                chain.push("... (chain truncated)".to_string());
                break;
            }
            chain.push(format!("caused by: {}", err));
            source = err.source();
        }
        chain.join("\n  ")
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.profile().status
    }

    fn error_code(&self) -> &'static str {
        self.profile().code
    }

    fn is_recoverable(&self) -> bool {
        self.profile().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.profile().action
    }

    fn is_sensitive(&self) -> bool {
        self.profile().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.profile().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Catalog(_) => "Catalog unavailable".to_string(),
            AppError::Storage(_) => "Storage unavailable".to_string(),
            AppError::InvalidSource(msg) => msg.clone(),
            AppError::Encode { variant, .. } => {
                format!("Could not encode the {} variant", variant)
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_are_sensitive_and_retryable() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Catalog("pool closed".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "CATALOG_ERROR");
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Catalog unavailable");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn not_found_passes_message_through() {
        let err = AppError::NotFound("Image not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert!(!err.is_sensitive());
        assert_eq!(err.client_message(), "Image not found");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn invalid_source_maps_to_bad_request() {
        let err = AppError::InvalidSource("undecodable bytes".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_SOURCE");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "undecodable bytes");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn encode_error_names_the_variant() {
        let err = AppError::Encode {
            variant: "thumbnail".to_string(),
            reason: "codec failure".to_string(),
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "ENCODE_ERROR");
        assert!(err.client_message().contains("thumbnail"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn detailed_message_walks_source_chain() {
        let root = anyhow::anyhow!("connection reset").context("pool checkout failed");
        let err = AppError::from(root);
        let details = err.detailed_message();
        assert!(details.contains("pool checkout failed"));
        assert!(details.contains("caused by: connection reset"));
    }
}
