//! 连接串服务
//!
//! 提供数据库连接串相关功能，包括：
//! - 各方言直连与连接池连接串生成
//! - 连接串模板语法标注

mod builder;
mod handlers;
mod routes;
mod service;
mod state;
mod syntax;
mod template;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::logging::init_tracing;
use state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

const SERVICE_NAME: &str = "connection-service";
const DEFAULT_PORT: u16 = 8081;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "连接串服务 API",
        version = "0.1.0",
        description = "数据库连接串生成与语法标注微服务"
    ),
    paths(
        handlers::build_connection_strings,
        handlers::annotate_syntax,
        handlers::list_dialects,
        handlers::health_check,
    ),
    components(schemas(
        common::models::BuildConnectionStringsRequest,
        common::models::AnnotateSyntaxRequest,
        common::models::ConnectionInfo,
        common::models::PoolingInfo,
        common::models::ConnectionMetadata,
        common::models::SyntaxOptions,
        common::models::ConnectionStrings,
        common::models::ConnectionStringSet,
        common::models::SyntaxToken,
        common::models::Dialect,
        handlers::HealthResponse,
    )),
    tags(
        (name = "connection-strings", description = "连接串端点"),
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

    let addr = config.addr();
    let app = routes::app(AppState::new(config), api_docs());

    info!(service = SERVICE_NAME, address = %addr, "启动服务");

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
