//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use assethub_core::error::{AppError, ErrorKind};

/// JSON error body: `{"error": ..., "details": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable error.
    pub error: String,
    /// Underlying cause, when there is one worth showing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorResponse,
}

impl ApiError {
    /// An error with a status and message.
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                error: error.into(),
                details: None,
            },
        }
    }

    /// Attach a details string.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match err.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Quota => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
            ErrorKind::Database
            | ErrorKind::Storage
            | ErrorKind::Serialization
            | ErrorKind::Configuration
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
        }
        Self::new(status, err.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_maps_to_status() {
        assert_eq!(
            ApiError::from(AppError::validation("bad")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AppError::configuration("no key")).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_are_omitted_when_absent() {
        let plain = serde_json::to_value(ApiError::new(StatusCode::BAD_REQUEST, "nope").body).unwrap();
        assert_eq!(plain, serde_json::json!({ "error": "nope" }));

        let detailed = ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed").with_details("why");
        assert_eq!(detailed.body.details.as_deref(), Some("why"));
    }
}
