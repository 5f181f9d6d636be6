//! Connect 向导服务
//!
//! 提供 Connect 向导的状态解析功能，包括：
//! - 框架、移动端 SDK 与 ORM 选择树
//! - 树路径与表单字段两种选择的统一解析
//! - 向导游标与深链接参数
//! - 基于 schema 的 Connect 表单

mod catalog;
mod cursor;
mod handlers;
mod resolver;
mod routes;
mod sheet;
mod state;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::logging::init_tracing;
use state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

const SERVICE_NAME: &str = "connect-service";
const DEFAULT_PORT: u16 = 8082;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Connect 向导服务 API",
        version = "0.1.0",
        description = "Connect 向导状态解析微服务"
    ),
    paths(
        handlers::get_catalog,
        handlers::resolve_selection,
        handlers::content_path,
        handlers::resolve_tab,
        handlers::apply_cursor,
        handlers::apply_sheet,
        handlers::health_check,
    ),
    components(schemas(
        common::models::ConnectionType,
        common::models::ConnectTab,
        common::models::Selection,
        common::models::Resolution,
        cursor::ConnectCursor,
        cursor::CursorAction,
        sheet::ConnectMode,
        sheet::ConnectState,
        sheet::FieldId,
        sheet::FieldValue,
        sheet::InitialState,
        sheet::SheetAction,
        sheet::SheetView,
        handlers::CatalogTree,
        handlers::ContentPathRequest,
        handlers::ContentPathResponse,
        handlers::TabResponse,
        handlers::CursorRequest,
        handlers::CursorResponse,
        handlers::QueryParam,
        handlers::SheetRequest,
        handlers::HealthResponse,
    )),
    tags(
        (name = "connect", description = "Connect 向导端点"),
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
