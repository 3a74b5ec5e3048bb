//! 上游透传 handlers
//!
//! - GET /api/configurations - 列表（查询串原样透传）
//! - POST /api/configurations - 创建（请求体原样透传）
//! - PUT /api/configurations/{id} - 更新（请求体原样透传）
//! - GET /api/configurations/{id}/content - 配置内容
//!
//! Authorization 头原样转发；状态码不重映射。

use crate::AppState;
use crate::middleware::forwarded_credential;
use crate::utils::response::{forwarded_response, json_rejection, proxy_error};
use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::HeaderMap,
    response::Response,
};
use serde_json::Value;

#[derive(serde::Deserialize)]
pub struct ConfigurationPath {
    id: String,
}

/// 列出配置
pub async fn list_configurations(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let credential = forwarded_credential(&headers);
    match state.upstream.list(query.as_deref(), &credential).await {
        Ok(response) => forwarded_response(response),
        Err(err) => proxy_error(err),
    }
}

/// 获取配置内容
pub async fn get_configuration_content(
    State(state): State<AppState>,
    Path(path): Path<ConfigurationPath>,
    headers: HeaderMap,
) -> Response {
    let credential = forwarded_credential(&headers);
    match state.upstream.fetch_content(&path.id, &credential).await {
        Ok(response) => forwarded_response(response),
        Err(err) => proxy_error(err),
    }
}

/// 创建配置
pub async fn create_configuration(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection(rejection),
    };
    let credential = forwarded_credential(&headers);
    forwarded_response(state.upstream.create(&body, &credential).await)
}

/// 更新配置
pub async fn update_configuration(
    State(state): State<AppState>,
    Path(path): Path<ConfigurationPath>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection(rejection),
    };
    let credential = forwarded_credential(&headers);
    forwarded_response(state.upstream.update(&path.id, &body, &credential).await)
}
