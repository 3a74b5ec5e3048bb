//! 表单输入验证
//!
//! - normalize_required：去除首尾空格并检查非空
//! - clean_mapping：丢弃键或值为空的映射行
//!
//! 失败返回 bad_request_error 响应。数值字段不在此校验，由 ScalarPolicy 决定。

use crate::utils::response::bad_request_error;
use api_contract::MachineConfigurationForm;
use axum::response::Response;
use std::collections::BTreeMap;

/// 验证必填字段，去除空格并检查非空
pub fn normalize_required(value: String, field: &str) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error(format!("{field} required")));
    }
    Ok(trimmed.to_string())
}

/// 丢弃空白键或空白值
pub fn clean_mapping(mapping: BTreeMap<String, String>) -> BTreeMap<String, String> {
    mapping
        .into_iter()
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

/// 验证表单：machine_id 与 editor_name 必填
pub fn validate_form(form: MachineConfigurationForm) -> Result<MachineConfigurationForm, Response> {
    Ok(MachineConfigurationForm {
        machine_id: normalize_required(form.machine_id, "machine_id")?,
        editor_name: normalize_required(form.editor_name, "editor_name")?,
        field_scalar: form.field_scalar,
        mapping: clean_mapping(form.mapping),
    })
}
