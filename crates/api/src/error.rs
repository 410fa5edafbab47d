//! Mapping of domain errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use quill_core::events::EventError;
use quill_core::post::PostError;
use quill_shared::AppError;

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        Self(err.into())
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, retryable = self.0.is_retryable(), "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }

        // Internal details stay in the log.
        let message = if matches!(self.0, AppError::Internal(_)) {
            "An error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code().to_ascii_lowercase(),
                "message": message,
                "retryable": self.0.is_retryable(),
            })),
        )
            .into_response()
    }
}
