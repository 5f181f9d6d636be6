//! 反向代理模块
//!
//! 按路径前缀把请求原样转发到对应的微服务。

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName},
    response::Response,
    routing::any,
    Extension, Router,
};
use tracing::debug;

use common::errors::{AppError, AppResult};
use common::middleware::request_id::{RequestId, REQUEST_ID_HEADER};

use crate::state::AppState;

/// 转发请求体的大小上限（字节）
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// 目标微服务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Connection,
    Connect,
    Insights,
}

impl Upstream {
    fn base_url(self, state: &AppState) -> &str {
        match self {
            Upstream::Connection => &state.service_urls.connection_service,
            Upstream::Connect => &state.service_urls.connect_service,
            Upstream::Insights => &state.service_urls.insights_service,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Upstream::Connection => "connection-service",
            Upstream::Connect => "connect-service",
            Upstream::Insights => "insights-service",
        }
    }
}

/// 创建代理路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/connection-strings", any(proxy_connection))
        .route("/api/connection-strings/{*rest}", any(proxy_connection))
        .route("/api/connect/{*rest}", any(proxy_connect))
        .route("/api/insights/{*rest}", any(proxy_insights))
}

async fn proxy_connection(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    req: Request,
) -> AppResult<Response> {
    forward(&state, Upstream::Connection, &request_id, req).await
}

async fn proxy_connect(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    req: Request,
) -> AppResult<Response> {
    forward(&state, Upstream::Connect, &request_id, req).await
}

async fn proxy_insights(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    req: Request,
) -> AppResult<Response> {
    forward(&state, Upstream::Insights, &request_id, req).await
}

/// 上游地址：服务基址加原始路径与查询串
pub fn upstream_url(base: &str, path_and_query: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}

/// 逐跳头部不转发
fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == header::HOST
        || name == header::CONNECTION
        || name == header::CONTENT_LENGTH
        || name == header::TRANSFER_ENCODING
        || name == header::UPGRADE
}

fn forwarded_headers(source: &HeaderMap) -> HeaderMap {
    source
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

async fn forward(
    state: &AppState,
    upstream: Upstream,
    request_id: &RequestId,
    req: Request,
) -> AppResult<Response> {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = upstream_url(upstream.base_url(state), path_and_query);
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::Validation(format!("无法读取请求体: {e}")))?;

    let mut headers = forwarded_headers(&parts.headers);
    if let Ok(value) = request_id.as_str().parse() {
        headers.insert(REQUEST_ID_HEADER.clone(), value);
    }

    debug!(upstream = upstream.name(), method = %parts.method, url = %url, "转发请求");

    let response = state
        .http_client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let headers = forwarded_headers(response.headers());
    let bytes = response.bytes().await?;

    let mut out = Response::new(Body::from(bytes));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    Ok(out)
}
