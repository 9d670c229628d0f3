//! HTTP boundary for the error taxonomy.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; anything that
//! converts into `AppError` converts into `HttpAppError` too, so `?` inside a
//! handler produces a consistent status, JSON body, and log line.

use atelier_core::{AppError, ErrorMetadata, LogLevel};
use atelier_storage::StorageError;
use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

/// Wire shape of every error body this API returns.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Stable code for programmatic handling, e.g. `"NOT_FOUND"`.
    pub code: String,
    /// True when retrying the request may succeed.
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Newtype over [`AppError`]; orphan rules forbid implementing the foreign
/// `IntoResponse` trait for the foreign `AppError` directly.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::from(err),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        })
    }
}

/// JSON extractor whose rejection renders as an [`ErrorResponse`] instead of
/// axum's plain-text 400. Use in place of `Json<T>` on write endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let kind = error.error_type();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, error_type = kind, "request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, error_type = kind, "request failed"),
        LogLevel::Error => tracing::error!(error = %error, error_type = kind, "request failed"),
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| {
            env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod")
        })
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let error = &self.0;
        log_error(error);

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = ErrorResponse {
            error: error.client_message(),
            details: Some(error.detailed_message()),
            error_type: Some(error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        };

        // Production responses never expose internals; outside production only
        // sensitive errors are stripped.
        if is_production_env() || error.is_sensitive() {
            body.details = None;
            body.error_type = None;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_not_found() {
        let HttpAppError(err) = StorageError::NotFound("missing object".to_string()).into();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "missing object"));
    }

    #[test]
    fn storage_failures_map_to_storage() {
        let HttpAppError(err) = StorageError::UploadFailed("refused".to_string()).into();
        assert!(matches!(err, AppError::Storage(msg) if msg == "refused"));

        let HttpAppError(err) = StorageError::DeleteFailed("refused".to_string()).into();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn invalid_key_maps_to_invalid_input() {
        let HttpAppError(err) = StorageError::InvalidKey("bad key".to_string()).into();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "bad key"));
    }

    #[test]
    fn error_response_omits_empty_optional_fields() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: None,
            error_type: None,
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert_eq!(
            json.get("recoverable").and_then(|v| v.as_bool()),
            Some(false)
        );
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
        assert!(json.get("suggested_action").is_none());
    }
}
