//! HTTP metrics middleware.
//!
//! Records every response, including framework-level rejections that never
//! reach a handler (404, 405).

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Middleware that records method, normalized path, status and duration.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request as HttpRequest, StatusCode},
        middleware,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    fn test_app() -> Router {
        Router::new()
            .route("/api/local-ip", get(|| async { "192.168.1.20" }))
            .route(
                "/api/token",
                post(|| async { (StatusCode::BAD_REQUEST, "Missing identity or name") }),
            )
            .layer(middleware::from_fn(http_metrics_middleware))
    }

    async fn status_of(method: Method, uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builder should succeed");

        test_app()
            .oneshot(request)
            .await
            .expect("request should succeed")
            .status()
    }

    #[tokio::test]
    async fn test_handler_responses_pass_through() {
        assert_eq!(status_of(Method::GET, "/api/local-ip").await, StatusCode::OK);
        assert_eq!(
            status_of(Method::POST, "/api/token").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_router_rejections_pass_through() {
        assert_eq!(
            status_of(Method::GET, "/api/token").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            status_of(Method::GET, "/viewer").await,
            StatusCode::NOT_FOUND
        );
    }
}
