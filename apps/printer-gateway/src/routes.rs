//! 路由定义
//!
//! - 健康检查：/health
//! - 计数器：/metrics
//! - 上游透传：/api/configurations/*（状态码与响应体原样返回）
//! - 表单流程：/api/printer-configs/*、/api/machines/{target_key}/configuration

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, put},
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route(
            "/api/configurations",
            get(list_configurations).post(create_configuration),
        )
        .route("/api/configurations/:id", put(update_configuration))
        .route(
            "/api/configurations/:id/content",
            get(get_configuration_content),
        )
        .route(
            "/api/printer-configs",
            get(list_printer_configs).post(create_printer_config),
        )
        .route(
            "/api/printer-configs/:id",
            get(get_printer_config).put(update_printer_config),
        )
        .route(
            "/api/machines/:target_key/configuration",
            get(get_machine_configuration),
        )
}
