//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docops_core::Error;
use tracing::error;

/// JSON error body `{error}` with a status code. Duplicates also carry
/// `existingCaseId`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    existing_case_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            existing_case_id: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Map a domain error. `context` is the generic message returned for
    /// unexpected failures; their details only go to the log.
    pub fn from_error(err: Error, context: &str) -> Self {
        match err {
            Error::Validation(msg) => Self::bad_request(msg),
            Error::NotFound(_) => Self::not_found("Case not found"),
            Error::DuplicateContent(existing) => Self {
                status: StatusCode::CONFLICT,
                message: "A case with this document already exists".into(),
                existing_case_id: Some(existing),
            },
            other => {
                error!("{}: {}", context, other);
                Self::internal(context)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({ "error": self.message });
        if let Some(id) = self.existing_case_id {
            body["existingCaseId"] = serde_json::Value::String(id);
        }
        (self.status, Json(body)).into_response()
    }
}

/// `.or_api("Failed to fetch cases")` on store and analyzer results.
pub trait ApiResultExt<T> {
    fn or_api(self, context: &str) -> Result<T, ApiError>;
}

impl<T> ApiResultExt<T> for docops_core::Result<T> {
    fn or_api(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_error(e, context))
    }
}
