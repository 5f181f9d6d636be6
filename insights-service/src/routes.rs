//! 查询性能服务路由模块

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use common::middleware::request_id::request_id_middleware;

use crate::handlers::{
    build_chart, clear_selection, get_selection, health_check, metric_badge, select_query,
};
use crate::state::AppState;

/// 创建查询性能路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/insights/{project_ref}/chart", post(build_chart))
        .route("/api/insights/{project_ref}/badge", post(metric_badge))
        .route(
            "/api/insights/{project_ref}/selection",
            get(get_selection).put(select_query).delete(clear_selection),
        )
        .route("/api/health", get(health_check))
}

/// 创建带中间件的完整应用
///
/// `docs` 为文档路由，与业务路由经过同一组中间件。
pub fn app(state: AppState, docs: Router<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(router())
        .merge(docs)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use common::config::AppConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::selection::QuerySelectionStore;

    fn test_app() -> (Router, Arc<QuerySelectionStore>) {
        let store = Arc::new(QuerySelectionStore::new());
        let config = AppConfig::load_with_service("insights-service", 8083);
        (app(AppState::new(config, store.clone()), crate::api_docs()), store)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn rows_request() -> Value {
        json!({
            "metric": "rows_read",
            "series": [
                { "timestamp": "2024-01-01T02:00:00Z", "value": 20.0 },
                { "timestamp": "2024-01-01T00:00:00Z", "value": 10.0 }
            ],
            "overlay": [{ "timestamp": "2024-01-01T01:00:00Z", "value": 4.0 }]
        })
    }

    #[tokio::test]
    async fn test_chart_endpoint() {
        let (app, _) = test_app();
        let (status, body) = send(app, json_request("POST", "/api/insights/abc/chart", rows_request())).await;
        assert_eq!(status, StatusCode::OK);
        let points = body["data"]["chart_data"].as_array().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0]["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(points[1]["rows"], 0.0);
        assert_eq!(points[1]["query_rows"], 4.0);
        assert_eq!(body["data"]["config"]["rows"]["format"], "count");
    }

    #[tokio::test]
    async fn test_chart_inactive_has_no_data() {
        let (app, _) = test_app();
        let mut req = rows_request();
        req["active_metric"] = json!("calls");
        let (status, body) = send(app, json_request("POST", "/api/insights/abc/chart", req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_selection_lifecycle() {
        let (app, store) = test_app();
        let mut events = store.subscribe();

        let (status, body) = send(
            app.clone(),
            json_request(
                "PUT",
                "/api/insights/abc/selection",
                json!({
                    "query_id": "q1",
                    "series": [{ "timestamp": "2024-01-01T00:00:00Z", "value": 7.0 }]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["query_id"], "q1");
        assert!(events.recv().await.is_ok());

        let badge_request = json!({
            "metric": "calls",
            "series": [{ "timestamp": "2024-01-01T00:00:00Z", "value": 100.0 }]
        });
        let (_, body) = send(
            app.clone(),
            json_request("POST", "/api/insights/abc/badge", badge_request),
        )
        .await;
        assert_eq!(body["data"]["value"], 7.0);
        assert_eq!(body["data"]["display"], "7");

        let (_, body) = send(app.clone(), empty_request("DELETE", "/api/insights/abc/selection")).await;
        assert_eq!(body["data"]["cleared"], true);

        let (status, body) = send(app, empty_request("GET", "/api/insights/abc/selection")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (app, _) = test_app();
        let (status, body) = send(
            app.clone(),
            json_request("PUT", "/api/insights/abc/selection", json!({ "query_id": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let long_ref = "x".repeat(65);
        let (status, _) = send(
            app,
            json_request("POST", &format!("/api/insights/{long_ref}/chart"), rows_request()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let (status, body) = send(app, empty_request("GET", "/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "insights-service");
        assert_eq!(body["selections"], 0);
    }

    #[tokio::test]
    async fn test_openapi_docs_carry_request_id() {
        let (app, _) = test_app();
        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/api/health"].is_object());
    }
}
