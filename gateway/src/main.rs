//! API 网关服务
//!
//! 作为所有客户端请求的入口点，提供以下功能：
//! - 请求路由转发到对应的微服务
//! - 聚合各服务的健康状态
//! - 请求/响应日志记录

mod proxy;
mod routes;
mod state;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig, ServiceUrls};
use common::logging::init_tracing;
use state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

const SERVICE_NAME: &str = "gateway";
const DEFAULT_PORT: u16 = 8080;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studio 连接与查询洞察 API",
        version = "0.1.0",
        description = "连接串、Connect 向导与查询性能微服务 API 网关"
    ),
    paths(
        routes::health_check,
        routes::aggregated_health,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::AggregatedHealth,
        routes::ServiceHealth,
    )),
    tags(
        (name = "gateway", description = "网关端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 先加载 .env 文件（如存在）
    load_dotenv();

    let config = AppConfig::load_with_service(SERVICE_NAME, DEFAULT_PORT);
    init_tracing(config.log_format);

    let service_urls = ServiceUrls::load();
    info!(
        connection_service = %service_urls.connection_service,
        connect_service = %service_urls.connect_service,
        insights_service = %service_urls.insights_service,
        "上游服务地址"
    );

    let addr = config.addr();
    let state = AppState::new(config, service_urls).context("创建 HTTP 客户端失败")?;
    let app = routes::app(state, api_docs());

    info!(service = SERVICE_NAME, address = %addr, "启动 API 网关");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {addr}"))?;
    axum::serve(listener, app).await.context("服务运行失败")?;
    Ok(())
}

/// 文档路由
fn api_docs() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
