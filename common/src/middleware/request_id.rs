//! Request ID middleware.
//!
//! Every request carries an `x-request-id`. The gateway forwards its own id to
//! the upstream services, so one id follows a call across the workspace.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest incoming id that is reused as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuses an acceptable incoming `x-request-id` or generates a new one, stores
/// it in the request extensions, runs the rest of the stack inside a `request`
/// span and echoes the ID on the response.
pub async fn request_id_middleware(mut req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(RequestId::accept)
        .unwrap_or_else(RequestId::generate);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.as_str(),
        method = %req.method(),
        uri = %req.uri(),
    );
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    response
}

/// Request ID stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(String);

impl RequestId {
    /// Returns the request ID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Incoming ids must be non-empty, at most 128 bytes and printable ASCII.
    fn accept(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let ok = !raw.is_empty()
            && raw.len() <= MAX_REQUEST_ID_LEN
            && raw.bytes().all(|b| b.is_ascii_graphic());
        ok.then(|| Self(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn echo(Extension(id): Extension<RequestId>) -> String {
        id.as_str().to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(echo))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    async fn response_id(header: Option<&str>) -> String {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-request-id", value);
        }
        let response = app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        response.headers()["x-request-id"].to_str().unwrap().to_string()
    }

    #[test]
    fn test_accept_rules() {
        assert_eq!(RequestId::accept(" req-1 ").unwrap().as_str(), "req-1");
        assert!(RequestId::accept("").is_none());
        assert!(RequestId::accept("has space").is_none());
        assert!(RequestId::accept(&"x".repeat(MAX_REQUEST_ID_LEN + 1)).is_none());
    }

    #[tokio::test]
    async fn test_incoming_id_is_reused() {
        assert_eq!(response_id(Some("abc-123")).await, "abc-123");
    }

    #[tokio::test]
    async fn test_missing_or_oversized_id_is_replaced() {
        assert_eq!(response_id(None).await.len(), 36);
        let long = "y".repeat(200);
        let id = response_id(Some(&long)).await;
        assert_ne!(id, long);
        assert_eq!(id.len(), 36);
    }
}
