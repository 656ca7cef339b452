use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vantage_core::error::{self, ApiError, EngineError};

/// Internal error type that converts to structured API responses
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request (400)
    #[error("{message}")]
    Validation {
        message: String,
        error_code: Option<String>,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// The scoring engine rejected an input (400)
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// More records than the configured snapshot limit (400)
    #[error("{field} has {items} records, limit is {limit}")]
    SnapshotTooLarge {
        field: String,
        items: usize,
        limit: usize,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                error_code,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    error_code,
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::Engine(err) => {
                let received = match &err {
                    EngineError::InvalidLevelKey { key, .. } => serde_json::json!(key),
                    EngineError::OutOfRangeRating { value, .. } => serde_json::json!(value),
                };
                (
                    StatusCode::BAD_REQUEST,
                    ApiError {
                        error: error::codes::VALIDATION_FAILED.to_string(),
                        error_code: Some(err.code().to_string()),
                        message: err.to_string(),
                        field: Some(err.field().to_string()),
                        received: Some(received),
                        request_id,
                        docs_hint: Some(
                            "Likelihood, impact and effectiveness accept a level key or a weight from 1 to 5. \
                             See GET /v1/scales for the accepted keys."
                                .to_string(),
                        ),
                    },
                )
            }
            AppError::SnapshotTooLarge {
                field,
                items,
                limit,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    error_code: Some(error::codes::SNAPSHOT_TOO_LARGE.to_string()),
                    message: format!("{field} has {items} records, limit is {limit}"),
                    field: Some(field),
                    received: Some(serde_json::json!(items)),
                    request_id,
                    docs_hint: Some(
                        "Split the assessment into smaller snapshots or raise VANTAGE_MAX_SNAPSHOT_ITEMS."
                            .to_string(),
                    ),
                },
            ),
        };

        (status, Json(api_error)).into_response()
    }
}
