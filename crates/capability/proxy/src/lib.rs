//! 上游配置 API 转发。
//!
//! 转发规则：
//! - 查询串、请求体、Authorization 头原样转发，仅改写路由
//! - 上游状态码不重映射，响应体按 JSON 重新序列化
//! - 传输层失败（DNS、连接拒绝、超时）返回合成响应：500 + `{ "error": "..." }`
//! - 响应体不是 JSON 时：写操作返回 `{}` + 上游状态码；读操作返回解析错误

mod http;

pub use http::HttpUpstream;

use async_trait::async_trait;
use domain::Credential;
use reqwest::StatusCode;
use serde_json::{Value, json};

/// 传输层失败时的合成状态码。
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

/// 转发错误。
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid upstream base url: {0}")]
    InvalidBaseUrl(String),
    #[error("http client error: {0}")]
    Client(String),
    #[error("upstream returned invalid json for {operation} (status {status}): {message}")]
    InvalidJson {
        operation: &'static str,
        status: u16,
        message: String,
    },
}

/// 响应来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrigin {
    Upstream,
    TransportFailure,
}

/// 转发结果（状态码 + JSON 响应体）。
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub body: Value,
    pub origin: ResponseOrigin,
}

impl ForwardedResponse {
    pub fn upstream(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            origin: ResponseOrigin::Upstream,
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            body: json!({ "error": message.into() }),
            origin: ResponseOrigin::TransportFailure,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_transport_failure(&self) -> bool {
        self.origin == ResponseOrigin::TransportFailure
    }

    /// 例如 `404 Not Found`。
    pub fn status_text(&self) -> String {
        match StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
        {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }

    /// 传输失败时的错误信息。
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// 上游配置 API 抽象。
///
/// 读操作在响应体非 JSON 时返回错误；写操作总是返回带状态码的响应。
#[async_trait]
pub trait ConfigurationUpstream: Send + Sync {
    /// GET /configurations?{query}
    async fn list(
        &self,
        query: Option<&str>,
        credential: &Credential,
    ) -> Result<ForwardedResponse, ProxyError>;

    /// GET /configurations/{id}/content
    async fn fetch_content(
        &self,
        id: &str,
        credential: &Credential,
    ) -> Result<ForwardedResponse, ProxyError>;

    /// POST /configurations
    async fn create(&self, body: &Value, credential: &Credential) -> ForwardedResponse;

    /// PUT /configurations/{id}
    async fn update(&self, id: &str, body: &Value, credential: &Credential) -> ForwardedResponse;
}
