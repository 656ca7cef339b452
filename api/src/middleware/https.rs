use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Enforce HTTPS behind a TLS-terminating proxy.
///
/// A request with `X-Forwarded-Proto: http` is redirected (308, so POST
/// bodies are replayed) to the HTTPS equivalent. All responses get HSTS.
pub async fn require_https(req: Request, next: Next) -> Response {
    let proto = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");

    if proto.eq_ignore_ascii_case("http") {
        if let Some(uri) = https_uri(&req) {
            let mut response =
                (StatusCode::PERMANENT_REDIRECT, [("location", uri.to_string())]).into_response();
            add_hsts_header(&mut response);
            return response;
        }
    }

    let mut response = next.run(req).await;
    add_hsts_header(&mut response);
    response
}

fn https_uri(req: &Request) -> Option<Uri> {
    let host = req
        .headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("https://{host}{path_and_query}").parse().ok()
}

fn add_hsts_header(response: &mut Response) {
    response.headers_mut().insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::{Router, middleware};
    use tower::ServiceExt;

    async fn ok() -> StatusCode {
        StatusCode::OK
    }

    fn app() -> Router {
        Router::new()
            .route("/v1/risk/classify", post(ok))
            .layer(middleware::from_fn(super::require_https))
    }

    #[tokio::test]
    async fn plain_http_is_redirected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/risk/classify?x=1")
                    .header("host", "risk.example.com")
                    .header("x-forwarded-proto", "http")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers().get("location").expect("location header should exist"),
            "https://risk.example.com/v1/risk/classify?x=1"
        );
    }

    #[tokio::test]
    async fn https_passes_through_with_hsts() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/risk/classify")
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("strict-transport-security").is_some());
    }
}
