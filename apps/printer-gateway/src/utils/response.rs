//! HTTP 响应辅助函数
//!
//! - 转发响应：状态码不重映射，响应体原样返回
//! - 错误响应：统一 `{ "error": "<message>" }`

use api_contract::ErrorBody;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use printer_access::AccessError;
use printer_proxy::{ForwardedResponse, ProxyError, TRANSPORT_FAILURE_STATUS};

/// 上游状态码（非法状态码视为 502）
fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// 错误响应
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::NOT_FOUND, message)
}

/// 请求体无法解析（非 JSON、缺少 content-type、字段缺失）
pub fn json_rejection(rejection: JsonRejection) -> Response {
    error_response(rejection.status(), rejection.body_text())
}

/// 转发响应（含传输失败的合成响应）
pub fn forwarded_response(response: ForwardedResponse) -> Response {
    (status_from(response.status), Json(response.body)).into_response()
}

/// 转发错误（读操作响应体非 JSON 等）
pub fn proxy_error(err: ProxyError) -> Response {
    error_response(status_from(TRANSPORT_FAILURE_STATUS), err.to_string())
}

/// 门面错误
pub fn access_error(err: AccessError) -> Response {
    let message = err.to_string();
    match err {
        AccessError::UpstreamStatus { status, .. } => error_response(status_from(status), message),
        AccessError::Payload(_) => error_response(StatusCode::UNPROCESSABLE_ENTITY, message),
        AccessError::Proxy(err) => proxy_error(err),
        AccessError::Transport { .. } | AccessError::Encode(_) => {
            error_response(status_from(TRANSPORT_FAILURE_STATUS), message)
        }
    }
}
