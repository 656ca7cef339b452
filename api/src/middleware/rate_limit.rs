use axum::http::{Response, StatusCode};
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
};

type RateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, governor::middleware::NoOpMiddleware, axum::body::Body>;

/// Rate limit for the scoring endpoints (/v1/risk/*, /v1/surveys/*):
/// 300 requests/minute per IP. Browser clients call these after every
/// debounced edit, so the burst is generous.
pub fn scoring_layer() -> RateLimitLayer {
    GovernorLayer::new(
        GovernorConfigBuilder::default()
            .per_millisecond(200) // 300 per minute = 5 per second replenish
            .burst_size(60)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("invalid governor config for scoring"),
    )
    .error_handler(json_error_handler)
}

/// Rate limit for static reference data (GET /v1/scales): 60 requests/minute per IP.
pub fn reference_layer() -> RateLimitLayer {
    GovernorLayer::new(
        GovernorConfigBuilder::default()
            .per_second(1)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("invalid governor config for reference"),
    )
    .error_handler(json_error_handler)
}

/// JSON error in ApiError format, with Retry-After when the limiter knows the wait.
fn json_error_handler(err: GovernorError) -> Response<axum::body::Body> {
    let (status, retry_after, message) = match err {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            Some(wait_time),
            format!("Too many requests. Retry after {wait_time} seconds."),
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            "Unable to determine client identity for rate limiting".to_string(),
        ),
        GovernorError::Other { code, msg, .. } => (code, None, msg.unwrap_or_default().to_string()),
    };

    let body = serde_json::json!({
        "error": vantage_core::error::codes::RATE_LIMITED,
        "message": message,
        "request_id": uuid::Uuid::now_v7().to_string(),
    });

    let mut response = Response::new(axum::body::Body::from(body.to_string()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        "content-type",
        axum::http::HeaderValue::from_static("application/json"),
    );
    if let Some(wait) = retry_after {
        headers.insert("retry-after", axum::http::HeaderValue::from(wait));
    }

    response
}
