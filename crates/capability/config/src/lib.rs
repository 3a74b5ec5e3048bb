//! 应用运行配置加载（上游地址、监听地址、回退 token）。

use std::env;

/// 上游配置 API 默认地址（集群内服务）。
pub const DEFAULT_CONFIG_API_BASE_URL: &str = "http://config-api-svc/api/v1";

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub config_api_base_url: String,
    /// 请求头缺失时使用的 SDK token
    pub sdk_token: Option<String>,
    pub upstream_timeout_seconds: Option<u64>,
    pub reject_invalid_scalar: bool,
    pub list_limit: u32,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = env::var("PRINTER_GATEWAY_HTTP_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let config_api_base_url = read_optional("CONFIG_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_CONFIG_API_BASE_URL.to_string());
        if !config_api_base_url.starts_with("http://") && !config_api_base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(
                "CONFIG_API_BASE_URL".to_string(),
                config_api_base_url,
            ));
        }
        let sdk_token = read_optional("Quix__Sdk__Token");
        let upstream_timeout_seconds =
            read_optional_u64("CONFIG_API_TIMEOUT_SECONDS")?.filter(|value| *value > 0);
        let reject_invalid_scalar = read_bool_with_default("PRINTER_REJECT_INVALID_SCALAR", true);
        let list_limit = read_u32_with_default("PRINTER_LIST_LIMIT", 30)?;

        Ok(Self {
            http_addr,
            config_api_base_url,
            sdk_token,
            upstream_timeout_seconds,
            reject_invalid_scalar,
            list_limit,
        })
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        Err(_) => Ok(None),
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
