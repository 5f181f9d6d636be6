//! 网关路由模块

use axum::{
    extract::State,
    middleware,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::ToSchema;

use common::middleware::request_id::request_id_middleware;

use crate::proxy;
use crate::state::AppState;

/// 创建网关路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/health/all", get(aggregated_health))
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
        .merge(proxy::router())
        .merge(docs)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 网关健康检查
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "网关运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// 聚合所有服务的健康检查
#[utoipa::path(
    get,
    path = "/api/health/all",
    tag = "health",
    responses(
        (status = 200, description = "聚合健康状态", body = AggregatedHealth)
    )
)]
pub async fn aggregated_health(State(state): State<AppState>) -> Json<AggregatedHealth> {
    let urls = &state.service_urls;
    let (connection, connect, insights) = tokio::join!(
        check_service_health(&state.http_client, "connection-service", &urls.connection_service),
        check_service_health(&state.http_client, "connect-service", &urls.connect_service),
        check_service_health(&state.http_client, "insights-service", &urls.insights_service),
    );
    let services = vec![connection, connect, insights];

    let all_healthy = services.iter().all(|s| s.healthy);

    Json(AggregatedHealth {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp: Utc::now(),
        services,
    })
}

async fn check_service_health(client: &reqwest::Client, name: &str, url: &str) -> ServiceHealth {
    let health_url = format!("{}/api/health", url.trim_end_matches('/'));

    let error = match client.get(&health_url).send().await {
        Ok(response) if response.status().is_success() => None,
        Ok(response) => Some(format!("HTTP {}", response.status())),
        Err(e) => Some(e.to_string()),
    };

    ServiceHealth {
        name: name.to_string(),
        url: url.to_string(),
        healthy: error.is_none(),
        error,
    }
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
}

/// 聚合健康响应
#[derive(Serialize, ToSchema)]
pub struct AggregatedHealth {
    /// 整体状态
    pub status: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
    /// 各服务健康状态
    pub services: Vec<ServiceHealth>,
}

/// 单个服务健康状态
#[derive(Serialize, ToSchema)]
pub struct ServiceHealth {
    /// 服务名称
    pub name: String,
    /// 服务地址
    pub url: String,
    /// 是否健康
    pub healthy: bool,
    /// 错误信息（如果不健康）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use common::config::{AppConfig, ServiceUrls};
    use serde_json::Value;
    use tower::ServiceExt;

    /// 所有上游都指向一个无人监听的端口
    fn test_app() -> Router {
        let unreachable = "http://127.0.0.1:1".to_string();
        let urls = ServiceUrls {
            connection_service: unreachable.clone(),
            connect_service: unreachable.clone(),
            insights_service: unreachable,
            timeout: Duration::from_secs(2),
        };
        let state = AppState::new(AppConfig::load_with_service("gateway", 8080), urls).unwrap();
        app(state, crate::api_docs())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "gateway");
    }

    #[tokio::test]
    async fn test_aggregated_health_reports_unreachable_services() {
        let (status, body) = get_json("/api/health/all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        let services = body["services"].as_array().unwrap();
        assert_eq!(services.len(), 3);
        assert_eq!(services[1]["name"], "connect-service");
        assert!(services.iter().all(|s| s["healthy"] == false));
    }

    #[tokio::test]
    async fn test_proxy_unreachable_upstream_is_unavailable() {
        let (status, body) = get_json("/api/connect/tab?parent=nextjs").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_openapi_docs_carry_request_id() {
        let app = test_app();
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
