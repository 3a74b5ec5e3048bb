//! 追踪、请求 ID 生成与转发计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub forwarded_requests: u64,
    pub upstream_non_success: u64,
    pub transport_failures: u64,
    pub unexpected_envelopes: u64,
    pub rejected_payloads: u64,
}

/// 进程级计数器（Relaxed，仅用于观测）。
pub struct TelemetryMetrics {
    forwarded_requests: AtomicU64,
    upstream_non_success: AtomicU64,
    transport_failures: AtomicU64,
    unexpected_envelopes: AtomicU64,
    rejected_payloads: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            forwarded_requests: AtomicU64::new(0),
            upstream_non_success: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            unexpected_envelopes: AtomicU64::new(0),
            rejected_payloads: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            forwarded_requests: self.forwarded_requests.load(Ordering::Relaxed),
            upstream_non_success: self.upstream_non_success.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            unexpected_envelopes: self.unexpected_envelopes.load(Ordering::Relaxed),
            rejected_payloads: self.rejected_payloads.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录一次上游转发（含传输失败）。
pub fn record_forwarded_request() {
    metrics().forwarded_requests.fetch_add(1, Ordering::Relaxed);
}

/// 记录上游返回非 2xx。
pub fn record_upstream_non_success() {
    metrics().upstream_non_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录传输层失败（DNS、连接拒绝、超时）。
pub fn record_transport_failure() {
    metrics().transport_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录无法识别的列表信封。
pub fn record_unexpected_envelope() {
    metrics().unexpected_envelopes.fetch_add(1, Ordering::Relaxed);
}

/// 记录本地拒绝的写请求（非法数值）。
pub fn record_rejected_payload() {
    metrics().rejected_payloads.fetch_add(1, Ordering::Relaxed);
}
