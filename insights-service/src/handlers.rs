//! Handler模块

use std::time::Instant;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::middleware::request_id::RequestId;
use common::models::{ChartData, ChartRequest, MetricBadge, SelectQueryRequest};
use common::response::ApiResponse;

use crate::selection::SelectedQuery;
use crate::state::AppState;

const MAX_PROJECT_REF_LEN: usize = 64;

fn validate_project_ref(project_ref: &str) -> AppResult<()> {
    if project_ref.is_empty() || project_ref.len() > MAX_PROJECT_REF_LEN {
        return Err(AppError::Validation(format!(
            "project_ref must be 1-{MAX_PROJECT_REF_LEN} characters"
        )));
    }
    Ok(())
}

/// 清除选中查询响应
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearSelectionResponse {
    /// 是否存在被清除的选中项
    pub cleared: bool,
}

/// 生成图表数据
#[utoipa::path(
    post,
    path = "/api/insights/{project_ref}/chart",
    tag = "insights",
    params(("project_ref" = String, Path, description = "项目标识")),
    request_body = ChartRequest,
    responses(
        (status = 200, description = "图表数据；序列为空或指标未激活时无 data", body = ApiResponse<ChartData>),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn build_chart(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(project_ref): Path<String>,
    Json(req): Json<ChartRequest>,
) -> AppResult<Json<ApiResponse<Option<ChartData>>>> {
    let started = Instant::now();
    validate_project_ref(&project_ref)?;
    req.validate()?;
    let chart = state.service.chart(&project_ref, &req).await;
    Ok(Json(
        ApiResponse::ok_with_service(chart, state.config.service_name.as_str())
            .with_request_id(request_id.as_str())
            .with_duration(started.elapsed().as_millis() as u64),
    ))
}

/// 选中查询的指标汇总
#[utoipa::path(
    post,
    path = "/api/insights/{project_ref}/badge",
    tag = "insights",
    params(("project_ref" = String, Path, description = "项目标识")),
    request_body = ChartRequest,
    responses(
        (status = 200, description = "指标汇总；无选中查询时无 data", body = ApiResponse<MetricBadge>),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn metric_badge(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(project_ref): Path<String>,
    Json(req): Json<ChartRequest>,
) -> AppResult<Json<ApiResponse<Option<MetricBadge>>>> {
    validate_project_ref(&project_ref)?;
    req.validate()?;
    let badge = state.service.badge(&project_ref, &req).await;
    Ok(Json(
        ApiResponse::ok_with_service(badge, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    ))
}

/// 获取选中查询
#[utoipa::path(
    get,
    path = "/api/insights/{project_ref}/selection",
    tag = "insights",
    params(("project_ref" = String, Path, description = "项目标识")),
    responses(
        (status = 200, description = "当前选中查询", body = ApiResponse<SelectedQuery>),
        (status = 404, description = "没有选中查询")
    )
)]
pub async fn get_selection(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(project_ref): Path<String>,
) -> AppResult<Json<ApiResponse<SelectedQuery>>> {
    validate_project_ref(&project_ref)?;
    let selection = state
        .service
        .selection(&project_ref)
        .await
        .ok_or_else(|| AppError::NotFound(format!("no selected query for {project_ref}")))?;
    Ok(Json(
        ApiResponse::ok_with_service(selection, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    ))
}

/// 设置选中查询
#[utoipa::path(
    put,
    path = "/api/insights/{project_ref}/selection",
    tag = "insights",
    params(("project_ref" = String, Path, description = "项目标识")),
    request_body = SelectQueryRequest,
    responses(
        (status = 200, description = "已选中的查询", body = ApiResponse<SelectedQuery>),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn select_query(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(project_ref): Path<String>,
    Json(req): Json<SelectQueryRequest>,
) -> AppResult<Json<ApiResponse<SelectedQuery>>> {
    validate_project_ref(&project_ref)?;
    req.validate()?;
    let selected = state.service.select(&project_ref, req).await;
    Ok(Json(
        ApiResponse::ok_with_service(selected, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    ))
}

/// 清除选中查询
#[utoipa::path(
    delete,
    path = "/api/insights/{project_ref}/selection",
    tag = "insights",
    params(("project_ref" = String, Path, description = "项目标识")),
    responses(
        (status = 200, description = "清除结果", body = ApiResponse<ClearSelectionResponse>)
    )
)]
pub async fn clear_selection(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(project_ref): Path<String>,
) -> AppResult<Json<ApiResponse<ClearSelectionResponse>>> {
    validate_project_ref(&project_ref)?;
    let cleared = state.service.clear(&project_ref).await;
    Ok(Json(
        ApiResponse::ok_with_service(
            ClearSelectionResponse { cleared },
            state.config.service_name.as_str(),
        )
        .with_request_id(request_id.as_str()),
    ))
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
        selections: state.service.store().len().await,
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
    /// 保存了选中查询的项目数
    pub selections: usize,
}
