//! 配置访问门面。
//!
//! 读写两条路径的错误语义不同：
//! - 读（fetch_existing_configs / fetch_full_configuration）：上游非 2xx 返回
//!   [`AccessError::UpstreamStatus`]，错误信息包含状态文本
//! - 写（create / update）：上游非 2xx 返回 `Ok(false)`，仅传输失败或本地拒绝时返回错误
//!
//! 凭据由调用方显式传入，门面不保存任何 token。

use api_contract::{ListQuery, MachineConfigurationForm};
use domain::{Content, Credential};
use printer_envelope::normalize;
use printer_payload::{PayloadError, ScalarPolicy, build_create_payload, build_update_payload};
use printer_proxy::{ConfigurationUpstream, ForwardedResponse, ProxyError};
use printer_telemetry::record_rejected_payload;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// 门面错误。
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("failed to {operation}: {status_text}")]
    UpstreamStatus {
        operation: &'static str,
        status: u16,
        status_text: String,
    },
    #[error("failed to {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 配置访问门面：转发 + 信封规范化 + 请求体构造。
#[derive(Clone)]
pub struct ConfigurationAccess {
    upstream: Arc<dyn ConfigurationUpstream>,
    list_query: ListQuery,
    scalar_policy: ScalarPolicy,
}

impl ConfigurationAccess {
    pub fn new(upstream: Arc<dyn ConfigurationUpstream>) -> Self {
        Self {
            upstream,
            list_query: ListQuery::default(),
            scalar_policy: ScalarPolicy::default(),
        }
    }

    pub fn with_list_query(mut self, list_query: ListQuery) -> Self {
        self.list_query = list_query;
        self
    }

    pub fn with_scalar_policy(mut self, scalar_policy: ScalarPolicy) -> Self {
        self.scalar_policy = scalar_policy;
        self
    }

    /// 拉取最近的打印机配置列表（每次都重新请求上游）。
    pub async fn fetch_existing_configs(
        &self,
        credential: &Credential,
    ) -> Result<Vec<Value>, AccessError> {
        let query = self.list_query.to_query_string();
        let response = self.upstream.list(Some(&query), credential).await?;
        let response = read_outcome("fetch configurations", response)?;
        let records = normalize(response.body);
        info!(target: "printer.access", count = records.len(), "configurations_fetched");
        Ok(records)
    }

    /// 拉取单条配置的完整内容。
    pub async fn fetch_full_configuration(
        &self,
        id: &str,
        credential: &Credential,
    ) -> Result<Value, AccessError> {
        let response = self.upstream.fetch_content(id, credential).await?;
        let response = read_outcome("fetch configuration", response)?;
        Ok(response.body)
    }

    /// 创建配置；上游 2xx 返回 true。
    pub async fn create_machine_configuration(
        &self,
        credential: &Credential,
        form: &MachineConfigurationForm,
    ) -> Result<bool, AccessError> {
        let payload = build_create_payload(
            &form.machine_id,
            &form.editor_name,
            &form.field_scalar,
            form.mapping.clone(),
        );
        self.check_scalar(&payload.content)?;
        let body = serde_json::to_value(&payload)?;
        let response = self.upstream.create(&body, credential).await;
        write_outcome("create configuration", response)
    }

    /// 更新配置内容（不修改 metadata）；上游 2xx 返回 true。
    pub async fn update_machine_configuration(
        &self,
        credential: &Credential,
        id: &str,
        form: &MachineConfigurationForm,
    ) -> Result<bool, AccessError> {
        let payload = build_update_payload(
            &form.machine_id,
            &form.editor_name,
            &form.field_scalar,
            form.mapping.clone(),
        );
        self.check_scalar(&payload.content)?;
        let body = serde_json::to_value(&payload)?;
        let response = self.upstream.update(id, &body, credential).await;
        write_outcome("update configuration", response)
    }

    fn check_scalar(&self, content: &Content) -> Result<(), AccessError> {
        if let Err(err) = self.scalar_policy.check(content) {
            record_rejected_payload();
            warn!(
                target: "printer.access",
                machine_id = %content.machine_id,
                error = %err,
                "payload_rejected"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

fn read_outcome(
    operation: &'static str,
    response: ForwardedResponse,
) -> Result<ForwardedResponse, AccessError> {
    if response.is_transport_failure() {
        return Err(AccessError::Transport {
            operation,
            message: response.error_message().unwrap_or_default().to_string(),
        });
    }
    if !response.is_success() {
        return Err(AccessError::UpstreamStatus {
            operation,
            status: response.status,
            status_text: response.status_text(),
        });
    }
    Ok(response)
}

fn write_outcome(operation: &'static str, response: ForwardedResponse) -> Result<bool, AccessError> {
    if response.is_transport_failure() {
        return Err(AccessError::Transport {
            operation,
            message: response.error_message().unwrap_or_default().to_string(),
        });
    }
    if !response.is_success() {
        warn!(
            target: "printer.access",
            operation,
            status = response.status,
            "write_rejected_by_upstream"
        );
    }
    Ok(response.is_success())
}

/// 记录的 `metadata.target_key`（缺失或非字符串时为 None）。
pub fn target_key_of(record: &Value) -> Option<&str> {
    record
        .get("metadata")?
        .get("target_key")?
        .as_str()
        .filter(|key| !key.is_empty())
}

/// 去重后的 target key 集合。
pub fn get_existing_target_keys(records: &[Value]) -> HashSet<String> {
    records
        .iter()
        .filter_map(target_key_of)
        .map(str::to_string)
        .collect()
}

/// 第一条 target key 匹配的记录。
pub fn find_by_target_key<'a>(records: &'a [Value], target_key: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|record| target_key_of(record) == Some(target_key))
}
