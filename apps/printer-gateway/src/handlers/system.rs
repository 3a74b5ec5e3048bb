//! 系统 handlers：健康检查与计数器快照

use api_contract::MetricsSnapshotDto;
use axum::{Json, response::IntoResponse};
use printer_telemetry::metrics;
use serde_json::json;

/// 健康检查
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// 计数器快照
pub async fn get_metrics() -> impl IntoResponse {
    let snapshot = metrics().snapshot();
    Json(MetricsSnapshotDto {
        forwarded_requests: snapshot.forwarded_requests,
        upstream_non_success: snapshot.upstream_non_success,
        transport_failures: snapshot.transport_failures,
        unexpected_envelopes: snapshot.unexpected_envelopes,
        rejected_payloads: snapshot.rejected_payloads,
    })
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{FakeUpstream, get_request, send, state_with};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn health_is_ok() {
        let state = state_with(Arc::new(FakeUpstream::default()), None);
        let (status, _, body) = send(state, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn metrics_expose_all_counters() {
        let state = state_with(Arc::new(FakeUpstream::default()), None);
        let (status, _, body) = send(state, get_request("/metrics", None)).await;
        assert_eq!(status, StatusCode::OK);
        for key in [
            "forwarded_requests",
            "upstream_non_success",
            "transport_failures",
            "unexpected_envelopes",
            "rejected_payloads",
        ] {
            assert!(body[key].is_u64(), "missing {key}");
        }
    }
}
