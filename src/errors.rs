use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::parser::ParseError;
use crate::remote_store::BackendError;
use crate::store::StoreError;
use crate::sync::SyncError;
use crate::tracing::current_request_id;
use crate::transfer::ImportError;

/// Error body returned by the schedules API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors raised by schedule operations outside the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

/// API error type for the `/api/schedules` endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to fetch data")]
    FetchFailed(#[source] BackendError),

    #[error("Failed to save data")]
    SaveFailed(#[source] BackendError),

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::FetchFailed(_) | ApiError::SaveFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = current_request_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        match &self {
            ApiError::FetchFailed(err) => {
                error!(error = %err, request_id = %request_id, "schedule backend GET failed")
            }
            ApiError::SaveFailed(err) => {
                error!(error = %err, request_id = %request_id, "schedule backend SET failed")
            }
            ApiError::InvalidBody(detail) => {
                tracing::debug!(detail = %detail, "rejected schedules payload")
            }
            ApiError::PayloadTooLarge => {
                tracing::warn!(request_id = %request_id, "schedules payload exceeds body limit")
            }
            ApiError::MethodNotAllowed => {}
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
