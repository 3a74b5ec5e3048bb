//! 打印机配置表单流程 handlers
//!
//! - GET /api/printer-configs - 最近配置 + 已占用的 target key
//! - POST /api/printer-configs - 由表单创建配置
//! - GET /api/printer-configs/{id} - 单条配置完整内容
//! - PUT /api/printer-configs/{id} - 由表单更新配置内容
//! - GET /api/machines/{target_key}/configuration - 按机器加载配置
//!
//! 凭据：请求 Bearer token 优先，回退到 SDK token。

use crate::AppState;
use crate::middleware::resolve_credential;
use crate::utils::response::{access_error, json_rejection, not_found_error};
use crate::utils::validate_form;
use api_contract::{
    MachineConfigurationForm, PrinterConfigDetailDto, PrinterConfigListDto, WriteResultDto,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use domain::ConfigurationRecord;
use printer_access::{find_by_target_key, get_existing_target_keys};
use tracing::info;

#[derive(serde::Deserialize)]
pub struct PrinterConfigPath {
    id: String,
}

#[derive(serde::Deserialize)]
pub struct MachinePath {
    target_key: String,
}

/// 列出最近的打印机配置
pub async fn list_printer_configs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let credential = resolve_credential(&state, &headers);
    let records = match state.access.fetch_existing_configs(&credential).await {
        Ok(records) => records,
        Err(err) => return access_error(err),
    };
    let mut target_keys: Vec<String> = get_existing_target_keys(&records).into_iter().collect();
    target_keys.sort();
    Json(PrinterConfigListDto {
        records,
        target_keys,
    })
    .into_response()
}

/// 获取单条配置
pub async fn get_printer_config(
    State(state): State<AppState>,
    Path(path): Path<PrinterConfigPath>,
    headers: HeaderMap,
) -> Response {
    let credential = resolve_credential(&state, &headers);
    match state.access.fetch_full_configuration(&path.id, &credential).await {
        Ok(content) => Json(content).into_response(),
        Err(err) => access_error(err),
    }
}

/// 按 target key 加载机器配置
pub async fn get_machine_configuration(
    State(state): State<AppState>,
    Path(path): Path<MachinePath>,
    headers: HeaderMap,
) -> Response {
    let credential = resolve_credential(&state, &headers);
    let records = match state.access.fetch_existing_configs(&credential).await {
        Ok(records) => records,
        Err(err) => return access_error(err),
    };
    let Some(record) =
        find_by_target_key(&records, &path.target_key).and_then(ConfigurationRecord::from_value)
    else {
        return not_found_error(format!("no configuration for {}", path.target_key));
    };
    match state
        .access
        .fetch_full_configuration(&record.id, &credential)
        .await
    {
        Ok(content) => Json(PrinterConfigDetailDto {
            id: record.id,
            target_key: record.metadata.target_key,
            content,
        })
        .into_response(),
        Err(err) => access_error(err),
    }
}

/// 由表单创建配置
pub async fn create_printer_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Json<MachineConfigurationForm>, JsonRejection>,
) -> Response {
    let Json(form) = match form {
        Ok(form) => form,
        Err(rejection) => return json_rejection(rejection),
    };
    let form = match validate_form(form) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let credential = resolve_credential(&state, &headers);
    match state
        .access
        .create_machine_configuration(&credential, &form)
        .await
    {
        Ok(success) => {
            info!(
                target: "printer.gateway",
                machine_id = %form.machine_id,
                success,
                "printer_config_created"
            );
            Json(WriteResultDto { success }).into_response()
        }
        Err(err) => access_error(err),
    }
}

/// 由表单更新配置内容
pub async fn update_printer_config(
    State(state): State<AppState>,
    Path(path): Path<PrinterConfigPath>,
    headers: HeaderMap,
    form: Result<Json<MachineConfigurationForm>, JsonRejection>,
) -> Response {
    let Json(form) = match form {
        Ok(form) => form,
        Err(rejection) => return json_rejection(rejection),
    };
    let form = match validate_form(form) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let credential = resolve_credential(&state, &headers);
    match state
        .access
        .update_machine_configuration(&credential, &path.id, &form)
        .await
    {
        Ok(success) => {
            info!(
                target: "printer.gateway",
                config_id = %path.id,
                success,
                "printer_config_updated"
            );
            Json(WriteResultDto { success }).into_response()
        }
        Err(err) => access_error(err),
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{
        FakeUpstream, get_request, json_request, send, state_with,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use printer_proxy::ForwardedResponse;
    use serde_json::json;
    use std::sync::Arc;

    fn listing() -> ForwardedResponse {
        ForwardedResponse::upstream(
            200,
            json!({
                "items": [
                    { "id": "cfg-2", "metadata": { "target_key": "M2" } },
                    { "id": "cfg-1", "metadata": { "target_key": "M1" } },
                    { "id": "cfg-0", "metadata": { "target_key": "M1" } }
                ]
            }),
        )
    }

    fn form() -> serde_json::Value {
        json!({
            "machine_id": " M1 ",
            "editor_name": "Alice",
            "field_scalar": "1.5",
            "mapping": { "T001": "sensor_1", "T002": "" }
        })
    }

    #[tokio::test]
    async fn list_returns_records_and_sorted_target_keys() {
        let upstream = Arc::new(FakeUpstream {
            list_response: Some(listing()),
            ..Default::default()
        });
        let state = state_with(upstream.clone(), Some("sdk-token"));

        let (status, _, body) = send(state, get_request("/api/printer-configs", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["target_keys"], json!(["M1", "M2"]));

        let calls = upstream.calls();
        assert_eq!(calls[0].authorization, "Bearer sdk-token");
        let query = calls[0].detail.clone().unwrap_or_default();
        assert!(query.contains("type=printer-config"));
        assert!(query.contains("limit=30"));
    }

    #[tokio::test]
    async fn request_token_wins_over_sdk_token() {
        let upstream = Arc::new(FakeUpstream::default());
        let state = state_with(upstream.clone(), Some("sdk-token"));

        send(
            state,
            get_request("/api/printer-configs", Some("Bearer portal-token")),
        )
        .await;

        assert_eq!(upstream.calls()[0].authorization, "Bearer portal-token");
    }

    #[tokio::test]
    async fn list_failure_carries_status_text() {
        let upstream = Arc::new(FakeUpstream {
            list_response: Some(ForwardedResponse::upstream(401, json!({}))),
            ..Default::default()
        });
        let state = state_with(upstream, None);

        let (status, _, body) = send(state, get_request("/api/printer-configs", None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(
            body["error"]
                .as_str()
                .unwrap_or_default()
                .contains("Unauthorized")
        );
    }

    #[tokio::test]
    async fn machine_configuration_uses_first_matching_record() {
        let upstream = Arc::new(FakeUpstream {
            list_response: Some(listing()),
            content_response: Some(ForwardedResponse::upstream(
                200,
                json!({ "machine_id": "M1", "field_scalar": 1.5 }),
            )),
            ..Default::default()
        });
        let state = state_with(upstream.clone(), None);

        let (status, _, body) = send(
            state,
            get_request("/api/machines/M1/configuration", Some("Bearer t")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "cfg-1");
        assert_eq!(body["target_key"], "M1");
        assert_eq!(body["content"]["machine_id"], "M1");
        assert_eq!(upstream.calls()[1].detail.as_deref(), Some("cfg-1"));
    }

    #[tokio::test]
    async fn unknown_machine_is_not_found() {
        let upstream = Arc::new(FakeUpstream {
            list_response: Some(listing()),
            ..Default::default()
        });
        let state = state_with(upstream.clone(), None);

        let (status, _, body) =
            send(state, get_request("/api/machines/M9/configuration", None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().is_some());
        assert_eq!(upstream.calls().len(), 1);
    }

    #[tokio::test]
    async fn create_builds_payload_from_form() {
        let upstream = Arc::new(FakeUpstream::default());
        let state = state_with(upstream.clone(), None);

        let (status, _, body) = send(
            state,
            json_request("POST", "/api/printer-configs", Some("Bearer t"), form()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let calls = upstream.calls();
        let sent = calls[0].body.clone().expect("body");
        assert_eq!(sent["metadata"]["type"], "printer-config");
        assert_eq!(sent["metadata"]["target_key"], "M1");
        assert_eq!(sent["metadata"]["category"], "Printer Settings");
        assert_eq!(sent["content"]["field_scalar"], 1.5);
        assert_eq!(sent["content"]["mapping"], json!({ "T001": "sensor_1" }));
    }

    #[tokio::test]
    async fn create_rejected_upstream_is_unsuccessful() {
        let upstream = Arc::new(FakeUpstream {
            write_response: Some(ForwardedResponse::upstream(409, json!({ "detail": "dup" }))),
            ..Default::default()
        });
        let state = state_with(upstream, None);

        let (status, _, body) = send(
            state,
            json_request("POST", "/api/printer-configs", Some("Bearer t"), form()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": false }));
    }

    #[tokio::test]
    async fn invalid_scalar_is_rejected_locally() {
        let upstream = Arc::new(FakeUpstream::default());
        let state = state_with(upstream.clone(), None);
        let mut body = form();
        body["field_scalar"] = json!("abc");

        let (status, _, response) = send(
            state,
            json_request("POST", "/api/printer-configs", Some("Bearer t"), body),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response["error"].as_str().is_some());
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_editor_is_bad_request() {
        let upstream = Arc::new(FakeUpstream::default());
        let state = state_with(upstream.clone(), None);
        let mut body = form();
        body["editor_name"] = json!("");

        let (status, _, _) = send(
            state,
            json_request("PUT", "/api/printer-configs/cfg-1", Some("Bearer t"), body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_form_body_is_json_error() {
        let upstream = Arc::new(FakeUpstream::default());
        let state = state_with(upstream.clone(), None);
        let request = Request::builder()
            .method("POST")
            .uri("/api/printer-configs")
            .header("content-type", "application/json")
            .body(Body::from(r#"{ "machine_id": "M1" }"#))
            .expect("request");

        let (status, _, body) = send(state, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().is_some());
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn update_sends_content_only() {
        let upstream = Arc::new(FakeUpstream::default());
        let state = state_with(upstream.clone(), None);

        let (status, _, body) = send(
            state,
            json_request("PUT", "/api/printer-configs/cfg-1", Some("Bearer t"), form()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
        let calls = upstream.calls();
        assert_eq!(calls[0].detail.as_deref(), Some("cfg-1"));
        let sent = calls[0].body.clone().expect("body");
        assert!(sent.get("metadata").is_none());
        assert_eq!(sent["content"]["machine_id"], "M1");
    }

    #[tokio::test]
    async fn transport_failure_on_write_is_server_error() {
        let upstream = Arc::new(FakeUpstream {
            write_response: Some(ForwardedResponse::transport_failure("connection refused")),
            ..Default::default()
        });
        let state = state_with(upstream, None);

        let (status, _, body) = send(
            state,
            json_request("PUT", "/api/printer-configs/cfg-1", Some("Bearer t"), form()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["error"]
                .as_str()
                .unwrap_or_default()
                .contains("connection refused")
        );
    }
}
