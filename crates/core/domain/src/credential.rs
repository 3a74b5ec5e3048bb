//! 调用方凭据（Authorization 头原值）。
//!
//! 本层只转发凭据，不签发也不校验。

use std::fmt;

/// Authorization 头的完整取值，例如 `Bearer <token>`。
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(String);

impl Credential {
    /// 直接使用调用方提供的 Authorization 头（原样转发）。
    pub fn from_header(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 由裸 token 构造 `Bearer <token>`。
    pub fn bearer(token: &str) -> Self {
        Self(format!("Bearer {}", token))
    }

    /// 显式的 token 选择策略：优先 primary（门户 token），其次 fallback（SDK token）。
    ///
    /// 两者都为空时仍返回 `Bearer `，由上游拒绝。
    pub fn resolve(primary: Option<&str>, fallback: Option<&str>) -> Self {
        let token = [primary, fallback]
            .into_iter()
            .flatten()
            .find(|token| !token.is_empty())
            .unwrap_or("");
        Self::bearer(token)
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }

    /// 是否携带非空 token。
    pub fn is_present(&self) -> bool {
        let value = self.0.trim();
        !value.is_empty() && value != "Bearer"
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential")
            .field(&if self.is_present() { "<redacted>" } else { "<empty>" })
            .finish()
    }
}
