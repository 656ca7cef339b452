//! JSON extractor that reports body errors in the structured `ApiError`
//! shape instead of axum's plain-text rejection.
//!
//! Level keys and ratings are validated while the snapshot deserializes, so
//! the serde message is also mapped onto the engine's error codes.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use vantage_core::error::codes;

use crate::error::AppError;

/// Drop-in replacement for `axum::Json<T>` in handler signatures.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

/// Convert a `JsonRejection` to a structured `AppError::Validation`.
pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    validation_from_message(&rejection.body_text())
}

fn validation_from_message(body_text: &str) -> AppError {
    let field_hint = extract_field_from_serde_message(body_text);
    let error_code = codes::from_deserialize_message(body_text);

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        error_code: error_code.map(str::to_string),
        field: Some(field_hint.unwrap_or_else(|| "body".to_string())),
        received: None,
        docs_hint: Some(
            "Check the request body against the endpoint schema (GET /api-doc/openapi.json). \
             Level keys are listed at GET /v1/scales."
                .to_string(),
        ),
    }
}

/// Try to extract a field name from serde's error messages.
fn extract_field_from_serde_message(msg: &str) -> Option<String> {
    for marker in ["missing field `", "unknown field `"] {
        if let Some(start) = msg.find(marker) {
            let after = &msg[start + marker.len()..];
            if let Some(end) = after.find('`') {
                return Some(after[..end].to_string());
            }
        }
    }
    // axum prefixes data errors with the JSON path, e.g.
    // "Failed to deserialize the JSON body into the target type: scenarios[0].likelihood: unknown variant ..."
    let (_, rest) = msg.split_once("target type: ")?;
    let (path, _) = rest.split_once(": ")?;
    (!path.is_empty() && !path.contains(' ')).then(|| path.to_string())
}
