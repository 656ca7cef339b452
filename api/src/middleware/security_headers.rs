use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

/// Headers every response carries unless the handler already set them.
///
/// Derived scores depend on the snapshot in the request body, so nothing is
/// cacheable. The CSP only restricts framing; Swagger UI needs its scripts.
const BASELINE: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("x-frame-options", "DENY"),
    ("content-security-policy", "frame-ancestors 'none'"),
    ("permissions-policy", "camera=(), geolocation=(), microphone=()"),
    ("cache-control", "no-store"),
];

pub async fn apply(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in BASELINE {
        headers
            .entry(*name)
            .or_insert(HeaderValue::from_static(*value));
    }
    response
}
