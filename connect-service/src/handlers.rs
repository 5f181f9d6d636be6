//! Handler模块

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::middleware::request_id::RequestId;
use common::models::{ConnectTab, ConnectionType, Resolution, Selection};
use common::response::ApiResponse;

use crate::cursor::{ConnectCursor, CursorAction};
use crate::resolver::{resolve, resolve_connect_tab_from_parent_key, resolve_content_path};
use crate::sheet::{ConnectSession, ConnectState, InitialState, SheetAction, SheetView};
use crate::state::AppState;

/// 目录查询参数
#[derive(Debug, Deserialize, IntoParams)]
pub struct CatalogQuery {
    /// 标签页键（frameworks / mobiles / orms / direct / mcp）
    pub tab: Option<String>,
}

/// 单个标签页的选择树
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogTree {
    pub tab: ConnectTab,
    pub nodes: Vec<ConnectionType>,
}

/// 内容路径请求
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContentPathRequest {
    pub tab: ConnectTab,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub parent: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub child: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub grandchild: String,
}

/// 内容路径响应
#[derive(Debug, Serialize, ToSchema)]
pub struct ContentPathResponse {
    /// 斜杠分隔的内容路径，无法解析时为空串
    pub content_path: String,
}

/// 标签页推断查询参数
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct TabQuery {
    /// 父级选项键
    #[validate(length(max = 64))]
    pub parent: Option<String>,
}

/// 标签页推断响应
#[derive(Debug, Serialize, ToSchema)]
pub struct TabResponse {
    pub tab: Option<ConnectTab>,
}

/// 游标操作请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct CursorRequest {
    /// 当前游标，缺省时从框架树的第一个节点开始
    #[serde(default)]
    pub cursor: Option<ConnectCursor>,
    #[serde(default)]
    pub action: Option<CursorAction>,
}

/// 深链接参数
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

/// 游标操作响应
#[derive(Debug, Serialize, ToSchema)]
pub struct CursorResponse {
    pub cursor: ConnectCursor,
    pub content_path: String,
    pub query_params: Vec<QueryParam>,
    pub resolution: Resolution,
}

/// 表单操作请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct SheetRequest {
    /// 当前状态，原样使用
    #[serde(default)]
    pub state: Option<ConnectState>,
    /// 未提供状态时叠加在默认值上的初始值
    #[serde(default)]
    pub initial: Option<InitialState>,
    #[serde(default)]
    pub action: Option<SheetAction>,
}

/// 获取选择树目录
#[utoipa::path(
    get,
    path = "/api/connect/catalog",
    tag = "connect",
    params(CatalogQuery),
    responses(
        (status = 200, description = "选择树目录", body = ApiResponse<Vec<CatalogTree>>),
        (status = 400, description = "未知标签页")
    )
)]
pub async fn get_catalog(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<Vec<CatalogTree>>>> {
    let tabs = match query.tab.as_deref() {
        Some(key) => vec![ConnectTab::from_key(key)
            .ok_or_else(|| AppError::Validation(format!("unknown tab: {key}")))?],
        None => vec![ConnectTab::Frameworks, ConnectTab::Mobiles, ConnectTab::Orms],
    };
    let data = tabs
        .into_iter()
        .map(|tab| CatalogTree {
            tab,
            nodes: state.catalog.tree(tab).to_vec(),
        })
        .collect();
    Ok(Json(
        ApiResponse::ok_with_service(data, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    ))
}

/// 解析选择（树路径或表单字段）
#[utoipa::path(
    post,
    path = "/api/connect/resolve",
    tag = "connect",
    request_body = Selection,
    responses(
        (status = 200, description = "内容路径、库与安装命令", body = ApiResponse<Resolution>)
    )
)]
pub async fn resolve_selection(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(selection): Json<Selection>,
) -> Json<ApiResponse<Resolution>> {
    let resolution = resolve(&selection, state.catalog);
    debug!(content_path = %resolution.content_path, "选择已解析");
    Json(
        ApiResponse::ok_with_service(resolution, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    )
}

/// 计算内容路径
#[utoipa::path(
    post,
    path = "/api/connect/content-path",
    tag = "connect",
    request_body = ContentPathRequest,
    responses(
        (status = 200, description = "内容路径", body = ApiResponse<ContentPathResponse>),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn content_path(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<ContentPathRequest>,
) -> AppResult<Json<ApiResponse<ContentPathResponse>>> {
    req.validate()?;
    let content_path = resolve_content_path(
        state.catalog.tree(req.tab),
        &req.parent,
        &req.child,
        &req.grandchild,
    );
    Ok(Json(
        ApiResponse::ok_with_service(
            ContentPathResponse { content_path },
            state.config.service_name.as_str(),
        )
        .with_request_id(request_id.as_str()),
    ))
}

/// 根据父级选项推断标签页
#[utoipa::path(
    get,
    path = "/api/connect/tab",
    tag = "connect",
    params(TabQuery),
    responses(
        (status = 200, description = "包含该父级选项的标签页", body = ApiResponse<TabResponse>),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn resolve_tab(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<TabQuery>,
) -> AppResult<Json<ApiResponse<TabResponse>>> {
    query.validate()?;
    let tab = resolve_connect_tab_from_parent_key(query.parent.as_deref(), state.catalog);
    Ok(Json(
        ApiResponse::ok_with_service(TabResponse { tab }, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    ))
}

/// 应用游标操作
#[utoipa::path(
    post,
    path = "/api/connect/cursor",
    tag = "connect",
    request_body = CursorRequest,
    responses(
        (status = 200, description = "新的游标及其内容路径", body = ApiResponse<CursorResponse>)
    )
)]
pub async fn apply_cursor(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<CursorRequest>,
) -> Json<ApiResponse<CursorResponse>> {
    let mut cursor = req
        .cursor
        .unwrap_or_else(|| ConnectCursor::new(state.catalog));
    if let Some(action) = req.action {
        cursor.apply(action, state.catalog);
    }

    let resolution = resolve(
        &Selection::TreePath {
            tab: Some(cursor.tab),
            parent: cursor.parent.clone(),
            child: cursor.child.clone(),
            grandchild: cursor.grandchild.clone(),
        },
        state.catalog,
    );
    let data = CursorResponse {
        content_path: cursor.content_path(state.catalog),
        query_params: cursor
            .query_params()
            .into_iter()
            .map(|(name, value)| QueryParam {
                name: name.to_string(),
                value,
            })
            .collect(),
        cursor,
        resolution,
    };
    Json(
        ApiResponse::ok_with_service(data, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    )
}

/// 应用表单操作
#[utoipa::path(
    post,
    path = "/api/connect/sheet",
    tag = "connect",
    request_body = SheetRequest,
    responses(
        (status = 200, description = "表单状态、可见字段与步骤", body = ApiResponse<SheetView>)
    )
)]
pub async fn apply_sheet(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<SheetRequest>,
) -> Json<ApiResponse<SheetView>> {
    let mut session = match req.state {
        Some(current) => ConnectSession::from_state(state.schema, state.catalog, current),
        None => ConnectSession::new(
            state.schema,
            state.catalog,
            req.initial.unwrap_or_default(),
        ),
    };
    if let Some(action) = req.action {
        session.apply(action);
    }
    Json(
        ApiResponse::ok_with_service(session.view(), state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    )
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        frameworks: state.catalog.framework_trees().count(),
    })
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
    /// 可选框架与移动端 SDK 数量
    pub frameworks: usize,
}
