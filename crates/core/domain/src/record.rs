//! 打印机配置记录模型。
//!
//! 上游配置 API 的记录结构：
//! - ConfigurationRecord：`{ id, metadata, content? }`
//! - Metadata：类型、目标机器、生效时间、分类、版本
//! - Content：机器 ID、编辑人、缩放系数、传感器映射

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 配置类型（固定值）。
pub const CONFIG_TYPE: &str = "printer-config";

/// 配置分类（固定值）。
pub const CONFIG_CATEGORY: &str = "Printer Settings";

/// 配置记录，`id` 由上游分配且创建后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub id: String,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl ConfigurationRecord {
    /// 从上游原始 JSON 宽松转换。
    ///
    /// 缺少 `id` 或 `metadata.target_key` 时返回 None；`content` 无法解析时置为 None。
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?.to_string();
        let metadata = Metadata::deserialize(value.get("metadata")?).ok()?;
        let content = value
            .get("content")
            .and_then(|content| Content::deserialize(content).ok());
        Some(Self {
            id,
            metadata,
            content,
        })
    }
}

/// 配置元数据。
///
/// `target_key` 标识物理机器，活动配置间的唯一性由上游负责。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "type", default = "default_config_type")]
    pub config_type: String,
    pub target_key: String,
    /// ISO-8601 时间戳
    #[serde(default)]
    pub valid_from: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_config_type() -> String {
    CONFIG_TYPE.to_string()
}

/// 配置内容。
///
/// `field_scalar` 为 NaN 时序列化为 JSON `null`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub machine_id: String,
    pub editor_name: String,
    #[serde(deserialize_with = "scalar_or_nan")]
    pub field_scalar: f64,
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

/// `null`（NaN 序列化结果）读回为 NaN。
fn scalar_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
