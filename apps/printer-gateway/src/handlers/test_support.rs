//! 路由测试辅助：上游替身与请求发送。

use crate::{AppState, build_app};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use domain::Credential;
use http_body_util::BodyExt;
use printer_access::ConfigurationAccess;
use printer_proxy::{ConfigurationUpstream, ForwardedResponse, ProxyError};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// 一次上游调用：操作、路径参数或查询串、Authorization 头、请求体。
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub operation: String,
    pub detail: Option<String>,
    pub authorization: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct FakeUpstream {
    pub list_response: Option<ForwardedResponse>,
    pub list_invalid_json: bool,
    pub content_response: Option<ForwardedResponse>,
    pub write_response: Option<ForwardedResponse>,
    pub calls: Mutex<Vec<UpstreamCall>>,
}

impl FakeUpstream {
    fn record(
        &self,
        operation: &str,
        detail: Option<String>,
        credential: &Credential,
        body: Option<Value>,
    ) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(UpstreamCall {
                operation: operation.to_string(),
                detail,
                authorization: credential.header_value().to_string(),
                body,
            });
        }
    }

    pub fn calls(&self) -> Vec<UpstreamCall> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl ConfigurationUpstream for FakeUpstream {
    async fn list(
        &self,
        query: Option<&str>,
        credential: &Credential,
    ) -> Result<ForwardedResponse, ProxyError> {
        self.record("list", query.map(str::to_string), credential, None);
        if self.list_invalid_json {
            return Err(ProxyError::InvalidJson {
                operation: "list",
                status: 200,
                message: "expected value at line 1 column 1".to_string(),
            });
        }
        Ok(self
            .list_response
            .clone()
            .unwrap_or_else(|| ForwardedResponse::upstream(200, json!([]))))
    }

    async fn fetch_content(
        &self,
        id: &str,
        credential: &Credential,
    ) -> Result<ForwardedResponse, ProxyError> {
        self.record("fetch_content", Some(id.to_string()), credential, None);
        Ok(self
            .content_response
            .clone()
            .unwrap_or_else(|| ForwardedResponse::upstream(200, json!({}))))
    }

    async fn create(&self, body: &Value, credential: &Credential) -> ForwardedResponse {
        self.record("create", None, credential, Some(body.clone()));
        self.write_response
            .clone()
            .unwrap_or_else(|| ForwardedResponse::upstream(201, json!({ "id": "cfg-new" })))
    }

    async fn update(&self, id: &str, body: &Value, credential: &Credential) -> ForwardedResponse {
        self.record("update", Some(id.to_string()), credential, Some(body.clone()));
        self.write_response
            .clone()
            .unwrap_or_else(|| ForwardedResponse::upstream(200, json!({ "id": id })))
    }
}

pub fn state_with(upstream: Arc<FakeUpstream>, sdk_token: Option<&str>) -> AppState {
    AppState {
        upstream: upstream.clone(),
        access: ConfigurationAccess::new(upstream),
        sdk_token: sdk_token.map(str::to_string),
    }
}

/// 发送请求，返回状态码、响应头与 JSON 响应体（空响应体为 Null）。
pub async fn send(state: AppState, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = build_app(state).oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, headers, body)
}

pub fn json_request(method: &str, uri: &str, authorization: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(authorization) = authorization {
        builder = builder.header("authorization", authorization);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(authorization) = authorization {
        builder = builder.header("authorization", authorization);
    }
    builder.body(Body::empty()).expect("request")
}
