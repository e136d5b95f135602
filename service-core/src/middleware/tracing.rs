use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Propagate the caller's `x-request-id`, or mint one, on both the request
/// (so the logging span can pick it up) and the response.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let header_value = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());

    let Some(header_value) = header_value else {
        return next.run(req).await;
    };

    req.headers_mut()
        .insert(REQUEST_ID_HEADER, header_value.clone());

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER, header_value);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get};
    use tower::util::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn generates_request_id_when_missing() {
        let response = app()
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("request id header missing");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn echoes_incoming_request_id() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");
    }
}
