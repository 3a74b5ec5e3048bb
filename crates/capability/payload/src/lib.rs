//! 创建/更新请求体构造。
//!
//! - 创建：完整 metadata（类型、target_key、valid_from、分类）+ content
//! - 更新：仅 content，不重新写入 valid_from/分类/版本
//!
//! 数值输入解析失败时得到 NaN，builder 本身不校验；
//! 是否在提交前拒绝由 [`ScalarPolicy`] 决定。

use api_contract::{CreateConfigurationRequest, UpdateConfigurationRequest};
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{CONFIG_CATEGORY, CONFIG_TYPE, Content, Metadata};
use std::collections::BTreeMap;

/// 请求体校验错误。
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("field_scalar must be a finite number, got {0}")]
    NonFiniteScalar(f64),
}

/// 非法数值的处理策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarPolicy {
    /// 提交前本地拒绝（默认）
    #[default]
    Reject,
    /// 原样提交，由上游校验（NaN 序列化为 null）
    Forward,
}

impl ScalarPolicy {
    pub fn from_reject_flag(reject: bool) -> Self {
        if reject {
            ScalarPolicy::Reject
        } else {
            ScalarPolicy::Forward
        }
    }

    pub fn check(&self, content: &Content) -> Result<(), PayloadError> {
        match self {
            ScalarPolicy::Reject if !content.field_scalar.is_finite() => {
                Err(PayloadError::NonFiniteScalar(content.field_scalar))
            }
            _ => Ok(()),
        }
    }
}

/// 解析数值输入（去除首尾空白），失败返回 NaN。
///
/// 整串必须是合法数值：`"12.5 kg"`、`"1,5"` 不取前缀，均得到 NaN，
/// 在默认的 [`ScalarPolicy::Reject`] 下会被拒绝。
pub fn parse_scalar(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// ISO-8601（UTC，毫秒精度，`Z` 后缀）。
pub fn format_valid_from(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn build_content(
    machine_id: &str,
    editor_name: &str,
    scalar: &str,
    mapping: BTreeMap<String, String>,
) -> Content {
    Content {
        machine_id: machine_id.to_string(),
        editor_name: editor_name.to_string(),
        field_scalar: parse_scalar(scalar),
        mapping,
    }
}

/// 构造创建请求体，valid_from 取当前时间。
pub fn build_create_payload(
    machine_id: &str,
    editor_name: &str,
    scalar: &str,
    mapping: BTreeMap<String, String>,
) -> CreateConfigurationRequest {
    build_create_payload_at(machine_id, editor_name, scalar, mapping, Utc::now())
}

/// 构造创建请求体，valid_from 由调用方指定。
pub fn build_create_payload_at(
    machine_id: &str,
    editor_name: &str,
    scalar: &str,
    mapping: BTreeMap<String, String>,
    now: DateTime<Utc>,
) -> CreateConfigurationRequest {
    CreateConfigurationRequest {
        metadata: Metadata {
            config_type: CONFIG_TYPE.to_string(),
            target_key: machine_id.to_string(),
            valid_from: format_valid_from(now),
            category: CONFIG_CATEGORY.to_string(),
            version: None,
            created_at: None,
        },
        content: build_content(machine_id, editor_name, scalar, mapping),
    }
}

/// 构造更新请求体（不含 metadata）。
pub fn build_update_payload(
    machine_id: &str,
    editor_name: &str,
    scalar: &str,
    mapping: BTreeMap<String, String>,
) -> UpdateConfigurationRequest {
    UpdateConfigurationRequest {
        content: build_content(machine_id, editor_name, scalar, mapping),
    }
}
