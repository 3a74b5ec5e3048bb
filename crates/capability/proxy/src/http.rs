//! 基于 reqwest 的上游转发实现。

use crate::{ConfigurationUpstream, ForwardedResponse, ProxyError};
use async_trait::async_trait;
use domain::Credential;
use printer_telemetry::{
    record_forwarded_request, record_transport_failure, record_upstream_non_success,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

/// 上游配置 API 客户端（base URL 进程内解析一次）。
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: Url,
}

impl HttpUpstream {
    /// `timeout` 为 None 时仅受传输层自身限制。
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ProxyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ProxyError::Client(err.to_string()))?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ProxyError> {
        let parsed = Url::parse(base_url)
            .map_err(|err| ProxyError::InvalidBaseUrl(format!("{}: {}", base_url, err)))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// base URL 后追加路径段（路径段会被百分号编码）。
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: Option<&Value>,
        credential: &Credential,
    ) -> Result<(u16, Vec<u8>), String> {
        record_forwarded_request();
        info!(
            target: "printer.proxy",
            operation,
            method = %method,
            url = %url,
            auth_present = credential.is_present(),
            "proxy_forward"
        );

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, credential.header_value());
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes.to_vec()))
        }
        .await;

        match result {
            Ok((status, bytes)) => {
                info!(
                    target: "printer.proxy",
                    operation,
                    status,
                    body_size = bytes.len(),
                    "proxy_response"
                );
                if !(200..300).contains(&status) {
                    record_upstream_non_success();
                }
                Ok((status, bytes))
            }
            Err(err) => {
                record_transport_failure();
                error!(target: "printer.proxy", operation, error = %err, "proxy_transport_failure");
                Err(err.to_string())
            }
        }
    }

    async fn forward_read(
        &self,
        operation: &'static str,
        url: Url,
        credential: &Credential,
    ) -> Result<ForwardedResponse, ProxyError> {
        match self.send(operation, Method::GET, url, None, credential).await {
            Ok((status, bytes)) => {
                let body = serde_json::from_slice::<Value>(&bytes).map_err(|err| {
                    ProxyError::InvalidJson {
                        operation,
                        status,
                        message: err.to_string(),
                    }
                })?;
                Ok(ForwardedResponse::upstream(status, body))
            }
            Err(message) => Ok(ForwardedResponse::transport_failure(message)),
        }
    }

    async fn forward_write(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: &Value,
        credential: &Credential,
    ) -> ForwardedResponse {
        match self.send(operation, method, url, Some(body), credential).await {
            Ok((status, bytes)) => {
                let body = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|err| {
                    warn!(
                        target: "printer.proxy",
                        operation,
                        status,
                        error = %err,
                        "proxy_write_body_not_json"
                    );
                    json!({})
                });
                ForwardedResponse::upstream(status, body)
            }
            Err(message) => ForwardedResponse::transport_failure(message),
        }
    }
}

#[async_trait]
impl ConfigurationUpstream for HttpUpstream {
    async fn list(
        &self,
        query: Option<&str>,
        credential: &Credential,
    ) -> Result<ForwardedResponse, ProxyError> {
        let mut url = self.endpoint(&["configurations"]);
        url.set_query(query.filter(|query| !query.is_empty()));
        self.forward_read("list", url, credential).await
    }

    async fn fetch_content(
        &self,
        id: &str,
        credential: &Credential,
    ) -> Result<ForwardedResponse, ProxyError> {
        let url = self.endpoint(&["configurations", id, "content"]);
        self.forward_read("fetch_content", url, credential).await
    }

    async fn create(&self, body: &Value, credential: &Credential) -> ForwardedResponse {
        let url = self.endpoint(&["configurations"]);
        self.forward_write("create", Method::POST, url, body, credential)
            .await
    }

    async fn update(&self, id: &str, body: &Value, credential: &Credential) -> ForwardedResponse {
        let url = self.endpoint(&["configurations", id]);
        self.forward_write("update", Method::PUT, url, body, credential)
            .await
    }
}
