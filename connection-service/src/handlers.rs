//! Handler模块

use std::time::Instant;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::AppError;
use common::middleware::request_id::RequestId;
use common::models::{
    AnnotateSyntaxRequest, BuildConnectionStringsRequest, ConnectionStrings, Dialect, SyntaxToken,
};
use common::response::ApiResponse;

use crate::state::AppState;

/// 生成直连与连接池连接串
#[utoipa::path(
    post,
    path = "/api/connection-strings",
    tag = "connection-strings",
    request_body = BuildConnectionStringsRequest,
    responses(
        (status = 200, description = "各方言连接串", body = ApiResponse<ConnectionStrings>),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn build_connection_strings(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<BuildConnectionStringsRequest>,
) -> Result<Json<ApiResponse<ConnectionStrings>>, AppError> {
    let started = Instant::now();
    req.validate()?;
    let data = state.service.build(&req);
    Ok(Json(
        ApiResponse::ok_with_service(data, state.config.service_name.as_str())
            .with_request_id(request_id.as_str())
            .with_duration(started.elapsed().as_millis() as u64),
    ))
}

/// 标注连接串模板语法
#[utoipa::path(
    post,
    path = "/api/connection-strings/syntax",
    tag = "connection-strings",
    request_body = AnnotateSyntaxRequest,
    responses(
        (status = 200, description = "带提示的语法片段，未知方言返回空列表", body = ApiResponse<Vec<SyntaxToken>>),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn annotate_syntax(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<AnnotateSyntaxRequest>,
) -> Result<Json<ApiResponse<Vec<SyntaxToken>>>, AppError> {
    req.validate()?;
    let data = state.service.annotate(&req);
    Ok(Json(
        ApiResponse::ok_with_service(data, state.config.service_name.as_str())
            .with_request_id(request_id.as_str()),
    ))
}

/// 列出支持的方言
#[utoipa::path(
    get,
    path = "/api/connection-strings/dialects",
    tag = "connection-strings",
    responses(
        (status = 200, description = "方言列表", body = ApiResponse<Vec<Dialect>>)
    )
)]
pub async fn list_dialects(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Dialect>>> {
    Json(
        ApiResponse::ok_with_service(state.service.dialects(), state.config.service_name.as_str())
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
        dialects: Dialect::ALL.len(),
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
    /// 支持的方言数量
    pub dialects: usize,
}
