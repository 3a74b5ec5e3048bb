//! 稳定的 DTO 与上游配置 API 契约。

use domain::{CONFIG_TYPE, Content, Metadata};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 创建配置请求体（POST /configurations）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConfigurationRequest {
    pub metadata: Metadata,
    pub content: Content,
}

/// 更新配置请求体（PUT /configurations/{id}）。
///
/// 仅包含 content，服务端的 version/created_at/valid_from 不受影响。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConfigurationRequest {
    pub content: Content,
}

/// 失败响应的错误体：`{ "error": "<message>" }`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// 列表查询参数（GET /configurations）。
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub config_type: String,
    pub type_operator: String,
    pub sort: String,
    pub sort_direction: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            config_type: CONFIG_TYPE.to_string(),
            type_operator: "$match".to_string(),
            sort: "created_at".to_string(),
            sort_direction: "desc".to_string(),
            limit: 30,
            offset: 0,
        }
    }
}

impl ListQuery {
    /// 编码为 `application/x-www-form-urlencoded` 查询串（参数顺序固定）。
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("type", &self.config_type)
            .append_pair("type__operator", &self.type_operator)
            .append_pair("sort", &self.sort)
            .append_pair("sort_direction", &self.sort_direction)
            .append_pair("limit", &self.limit.to_string())
            .append_pair("offset", &self.offset.to_string())
            .finish()
    }
}

/// 表单字段（创建/更新机器配置）。
///
/// `field_scalar` 保留原始输入文本，由 payload builder 解析。
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfigurationForm {
    pub machine_id: String,
    pub editor_name: String,
    #[serde(deserialize_with = "scalar_text")]
    pub field_scalar: String,
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

/// 表单中的数值既可以是字符串也可以是 JSON 数字。
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// 写操作结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResultDto {
    pub success: bool,
}

/// 配置列表返回结构（记录原样透传 + 去重后的 target key）。
#[derive(Debug, Clone, Serialize)]
pub struct PrinterConfigListDto {
    pub records: Vec<Value>,
    pub target_keys: Vec<String>,
}

/// 按 target key 加载的配置详情。
#[derive(Debug, Clone, Serialize)]
pub struct PrinterConfigDetailDto {
    pub id: String,
    pub target_key: String,
    pub content: Value,
}

/// 计数器快照。
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshotDto {
    pub forwarded_requests: u64,
    pub upstream_non_success: u64,
    pub transport_failures: u64,
    pub unexpected_envelopes: u64,
    pub rejected_payloads: u64,
}
