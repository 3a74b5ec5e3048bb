//! 请求上下文与凭据提取
//!
//! - request_context：注入 request_id/trace_id
//! - forwarded_credential：Authorization 头原样转发（缺失时为空串）
//! - resolve_credential：表单流程使用，请求 token 优先，其次配置的 SDK token
//!
//! 网关不校验 token，由上游负责鉴权。

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use domain::Credential;
use printer_telemetry::new_request_ids;
use tracing::{Instrument, info_span};

use crate::AppState;

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

/// 从请求头中提取 Bearer token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header_value = headers.get(header::AUTHORIZATION)?;
    let auth_str = header_value.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

/// Authorization 头原值（不解析、不校验）
pub fn forwarded_credential(headers: &HeaderMap) -> Credential {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    Credential::from_header(value)
}

/// 表单流程的 token 选择：请求 token 优先，回退到 SDK token
pub fn resolve_credential(state: &AppState, headers: &HeaderMap) -> Credential {
    Credential::resolve(bearer_token(headers), state.sdk_token.as_deref())
}
