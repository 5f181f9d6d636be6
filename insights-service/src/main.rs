//! 查询性能服务
//!
//! 提供查询性能看板的数据适配功能，包括：
//! - 按指标生成图表数据与序列配置
//! - 选中查询的叠加序列与指标汇总
//! - 按项目保存选中查询并广播变更

mod adapter;
mod badge;
mod format;
mod handlers;
mod routes;
mod selection;
mod service;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::logging::init_tracing;
use selection::{QuerySelectionStore, SelectionEvent, DEFAULT_MAX_PROJECTS};
use state::AppState;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "insights-service";
const DEFAULT_PORT: u16 = 8083;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "查询性能服务 API",
        version = "0.1.0",
        description = "查询性能图表适配微服务"
    ),
    paths(
        handlers::build_chart,
        handlers::metric_badge,
        handlers::get_selection,
        handlers::select_query,
        handlers::clear_selection,
        handlers::health_check,
    ),
    components(schemas(
        common::models::ChartRequest,
        common::models::ChartData,
        common::models::ChartPoint,
        common::models::SeriesConfig,
        common::models::ValueFormat,
        common::models::MetricType,
        common::models::MetricBadge,
        common::models::QueryInsightsMetric,
        common::models::SelectQueryRequest,
        selection::SelectedQuery,
        selection::SelectionEvent,
        handlers::ClearSelectionResponse,
        handlers::HealthResponse,
    )),
    tags(
        (name = "insights", description = "查询性能端点"),
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

    let max_projects = std::env::var("INSIGHTS_MAX_SELECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_PROJECTS);
    let store = Arc::new(QuerySelectionStore::with_capacity(max_projects));
    spawn_selection_logger(&store);

    let addr = config.addr();
    let app = routes::app(AppState::new(config, store), api_docs());

    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {addr}"))?;
    axum::serve(listener, app).await.context("服务运行失败")?;
    Ok(())
}

/// 记录选中查询的变更事件
fn spawn_selection_logger(store: &QuerySelectionStore) {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SelectionEvent::Selected {
                    project_ref,
                    query_id,
                }) => info!(project_ref = %project_ref, query_id = %query_id, "选中查询变更"),
                Ok(SelectionEvent::Cleared { project_ref }) => {
                    info!(project_ref = %project_ref, "选中查询已清除")
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "选中查询事件积压"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// 文档路由
fn api_docs() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
