use serde::Serialize;
use utoipa::ToSchema;

/// Failures raised by the scoring engine.
///
/// The engine never performs I/O, so every variant describes bad input.
/// Unknown keys and out-of-range ratings are rejected instead of being
/// coerced to a default weight.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A likelihood, impact or effectiveness key that no scale defines.
    #[error("unknown {scale} level '{key}'")]
    InvalidLevelKey { scale: &'static str, key: String },
    /// A weight or rating outside 1..=5.
    #[error("{field} must be between 1 and 5, got {value}")]
    OutOfRangeRating { field: &'static str, value: i64 },
}

impl EngineError {
    /// Machine code used in structured error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidLevelKey { .. } => codes::INVALID_LEVEL_KEY,
            EngineError::OutOfRangeRating { .. } => codes::OUT_OF_RANGE_RATING,
        }
    }

    /// Name of the input that was rejected.
    pub fn field(&self) -> &'static str {
        match self {
            EngineError::InvalidLevelKey { scale, .. } => scale,
            EngineError::OutOfRangeRating { field, .. } => field,
        }
    }
}

/// Structured error response shared by the API and the CLI.
/// Every error carries enough context for a caller to correct the input.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "rate_limited")
    pub error: String,
    /// Domain-specific code, e.g. "invalid_level_key"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const INVALID_LEVEL_KEY: &str = "invalid_level_key";
    pub const OUT_OF_RANGE_RATING: &str = "out_of_range_rating";
    pub const SNAPSHOT_TOO_LARGE: &str = "snapshot_too_large";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const RATE_LIMITED: &str = "rate_limited";

    /// Recover the engine code from a deserialization message. Level enums
    /// and ratings validate while a snapshot is parsed, so their failures
    /// arrive as serde text rather than as `EngineError` values.
    pub fn from_deserialize_message(msg: &str) -> Option<&'static str> {
        if msg.contains("unknown variant `") {
            Some(INVALID_LEVEL_KEY)
        } else if msg.contains("must be between 1 and 5") {
            Some(OUT_OF_RANGE_RATING)
        } else {
            None
        }
    }
}
