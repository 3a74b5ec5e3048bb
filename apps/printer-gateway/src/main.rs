//! 打印机配置网关：对浏览器暴露 /api/*，转发到集群内的配置 API。

mod handlers;
mod middleware;
mod routes;
mod utils;

use api_contract::ListQuery;
use axum::Router;
use printer_access::ConfigurationAccess;
use printer_config::AppConfig;
use printer_payload::ScalarPolicy;
use printer_proxy::{ConfigurationUpstream, HttpUpstream};
use printer_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    /// /api/configurations* 原样转发
    pub upstream: Arc<dyn ConfigurationUpstream>,
    /// /api/printer-configs* 表单流程
    pub access: ConfigurationAccess,
    /// 请求未携带 token 时的回退 token
    pub sdk_token: Option<String>,
}

impl AppState {
    pub fn from_config(upstream: Arc<dyn ConfigurationUpstream>, config: &AppConfig) -> Self {
        let list_query = ListQuery {
            limit: config.list_limit,
            ..ListQuery::default()
        };
        let access = ConfigurationAccess::new(upstream.clone())
            .with_list_query(list_query)
            .with_scalar_policy(ScalarPolicy::from_reject_flag(config.reject_invalid_scalar));
        Self {
            upstream,
            access,
            sdk_token: config.sdk_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 上游地址进程内只解析一次
    let upstream = HttpUpstream::new(
        &config.config_api_base_url,
        config.upstream_timeout_seconds.map(Duration::from_secs),
    )?;
    info!(
        target: "printer.gateway",
        upstream = %upstream.base_url(),
        http_addr = %config.http_addr,
        sdk_token_configured = config.sdk_token.is_some(),
        "printer_gateway_starting"
    );

    let state = AppState::from_config(Arc::new(upstream), &config);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// 组装路由与中间件。
pub fn build_app(state: AppState) -> Router {
    routes::create_api_router()
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(TraceLayer::new_for_http())
}
