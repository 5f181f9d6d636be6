//! Connect 向导路由模块

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use common::middleware::request_id::request_id_middleware;

use crate::handlers::{
    apply_cursor, apply_sheet, content_path, get_catalog, health_check, resolve_selection,
    resolve_tab,
};
use crate::state::AppState;

/// 创建 Connect 向导路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/connect/catalog", get(get_catalog))
        .route("/api/connect/resolve", post(resolve_selection))
        .route("/api/connect/content-path", post(content_path))
        .route("/api/connect/tab", get(resolve_tab))
        .route("/api/connect/cursor", post(apply_cursor))
        .route("/api/connect/sheet", post(apply_sheet))
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
