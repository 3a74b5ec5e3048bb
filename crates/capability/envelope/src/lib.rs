//! 列表响应信封规范化。
//!
//! 上游不保证固定的信封结构，按以下优先级匹配（命中即停）：
//! 1. 裸数组
//! 2. `{ "items": [...] }`
//! 3. `{ "data": [...] }`
//! 4. `{ "configurations": [...] }`
//!
//! 均不匹配时返回空列表并记录诊断日志，不视为错误。
//! 单条记录不做结构校验，原样透传。

use printer_telemetry::record_unexpected_envelope;
use serde_json::Value;
use tracing::warn;

/// 已识别的信封结构。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    BareArray,
    Items,
    Data,
    Configurations,
}

/// 匹配顺序（固定优先级）。
const RULES: [EnvelopeShape; 4] = [
    EnvelopeShape::BareArray,
    EnvelopeShape::Items,
    EnvelopeShape::Data,
    EnvelopeShape::Configurations,
];

impl EnvelopeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeShape::BareArray => "array",
            EnvelopeShape::Items => "items",
            EnvelopeShape::Data => "data",
            EnvelopeShape::Configurations => "configurations",
        }
    }

    fn field(&self) -> Option<&'static str> {
        match self {
            EnvelopeShape::BareArray => None,
            other => Some(other.as_str()),
        }
    }

    fn matches(&self, raw: &Value) -> bool {
        match self.field() {
            None => raw.is_array(),
            Some(field) => raw.get(field).is_some_and(Value::is_array),
        }
    }

    fn extract(&self, raw: Value) -> Vec<Value> {
        let target = match self.field() {
            None => raw,
            Some(field) => match raw {
                Value::Object(mut object) => object.remove(field).unwrap_or(Value::Null),
                _ => Value::Null,
            },
        };
        match target {
            Value::Array(records) => records,
            _ => Vec::new(),
        }
    }
}

/// 返回第一个命中的信封结构。
pub fn detect_shape(raw: &Value) -> Option<EnvelopeShape> {
    RULES.into_iter().find(|shape| shape.matches(raw))
}

/// 提取记录列表（保持原顺序）。
pub fn normalize(raw: Value) -> Vec<Value> {
    match detect_shape(&raw) {
        Some(shape) => shape.extract(raw),
        None => {
            record_unexpected_envelope();
            warn!(
                target: "printer.envelope",
                kind = value_kind(&raw),
                keys = ?top_level_keys(&raw),
                "unexpected_list_envelope"
            );
            Vec::new()
        }
    }
}

fn value_kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn top_level_keys(raw: &Value) -> Vec<&str> {
    raw.as_object()
        .map(|object| object.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
