// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FlightHub 2 capabilities resolved through the registry against a mock cloud.

use std::time::Duration;

use dronegate_core::{
    CapabilityKey, DroneGateError, FlightTaskApi, ProjectApi, RequestContext, TenantContext,
    VendorType, WaylineApi,
};
use dronegate_fh2::{Fh2Settings, register_fh2_with};
use dronegate_plugin::CapabilityRegistry;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TASK_UUID: &str = "6f1c2a9e-8d3b-4c7a-9e21-0b5d4f3a2c11";

fn settings(server: &MockServer) -> Fh2Settings {
    Fh2Settings {
        host: server.uri(),
        q: "farm".into(),
        user_token: Some("org-token".into()),
        project_uuid: Some("proj-default".into()),
        page_size: 20,
        language: "zh".into(),
        request_timeout: Duration::from_secs(5),
    }
}

fn fh2() -> VendorType {
    VendorType::from(VendorType::FH2)
}

async fn registry(server: &MockServer) -> CapabilityRegistry {
    let registry = CapabilityRegistry::new();
    register_fh2_with(&registry, settings(server), reqwest::Client::new());
    registry.enable(&fh2());
    registry
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 0, "message": "ok", "data": data}))
}

#[tokio::test]
async fn projects_use_configured_filter_and_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi/v0.1/project"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "20"))
        .and(query_param("q", "farm"))
        .and(query_param("prj_authorized_status", "project-status-authorized"))
        .and(query_param("usage", "simple"))
        .and(query_param("sort_column", "created_at"))
        .and(query_param("sort_type", "ASC"))
        .and(header("X-User-Token", "org-token"))
        .and(header("X-Project-Uuid", "proj-default"))
        .respond_with(ok(json!({"list": [{"uuid": "p-1", "name": "Farm"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server).await;
    let projects = registry
        .resolve_as::<dyn ProjectApi>(&fh2())
        .await
        .unwrap()
        .unwrap();
    let data = projects.projects(&RequestContext::new(), None).await.unwrap();
    assert_eq!(data["list"][0]["name"], "Farm");
}

#[tokio::test]
async fn tenant_identity_overrides_organisation_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi/v0.1/device/DOCK-7/state"))
        .and(header("X-User-Token", "tenant-token"))
        .and(header("X-Project-Uuid", "proj-tenant"))
        .and(header("X-Language", "en"))
        .respond_with(ok(json!({"mode_code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server).await;
    let projects = registry
        .resolve_as::<dyn ProjectApi>(&fh2())
        .await
        .unwrap()
        .unwrap();
    let ctx = RequestContext::new()
        .with_tenant(TenantContext::new(11, "tenant-token", Some("proj-tenant".into())))
        .with_language("en");
    let data = projects.device_state(&ctx, "DOCK-7").await.unwrap();
    assert_eq!(data["mode_code"], 0);
}

#[tokio::test]
async fn hms_joins_device_serials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi/v0.1/device/hms"))
        .and(query_param("device_sn_list", "SN-1,SN-2"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server).await;
    let projects = registry
        .resolve_as::<dyn ProjectApi>(&fh2())
        .await
        .unwrap()
        .unwrap();
    projects
        .device_hms(&RequestContext::new(), &["SN-1".to_string(), "SN-2".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn flight_task_lifecycle_hits_task_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openapi/v0.1/flight-task"))
        .and(body_json(json!({"name": "survey", "wayline_uuid": TASK_UUID})))
        .respond_with(ok(json!({"task_uuid": TASK_UUID})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/openapi/v0.1/flight-task/{TASK_UUID}/status")))
        .and(body_json(json!({"status": "suspended"})))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/openapi/v0.1/flight-task/{TASK_UUID}/track")))
        .respond_with(ok(json!({"points": []})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server).await;
    let tasks = registry
        .resolve_as::<dyn FlightTaskApi>(&fh2())
        .await
        .unwrap()
        .unwrap();
    let ctx = RequestContext::new();

    let created = tasks
        .create_flight_task(&ctx, &json!({"name": "survey", "wayline_uuid": TASK_UUID}))
        .await
        .unwrap();
    assert_eq!(created["task_uuid"], TASK_UUID);
    tasks
        .update_flight_task_status(&ctx, TASK_UUID, &json!({"status": "suspended"}))
        .await
        .unwrap();
    let track = tasks.flight_task_track(&ctx, TASK_UUID).await.unwrap();
    assert!(track["points"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn finish_upload_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openapi/v0.1/wayline/finish-upload"))
        .and(body_json(json!({"name": "route \"a\".kmz", "object_key": "org/waylines/a.kmz"})))
        .respond_with(ok(json!({"id": "w-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server).await;
    let waylines = registry
        .resolve_as::<dyn WaylineApi>(&fh2())
        .await
        .unwrap()
        .unwrap();
    let data = waylines
        .finish_upload(&RequestContext::new(), "org/waylines/a.kmz", "route \"a\".kmz")
        .await
        .unwrap();
    assert_eq!(data["id"], "w-1");
}

#[tokio::test]
async fn business_error_is_reported_with_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi/v0.1/wayline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 5001,
            "message": "quota exceeded",
            "data": null
        })))
        .mount(&server)
        .await;

    let registry = registry(&server).await;
    let waylines = registry
        .resolve_as::<dyn WaylineApi>(&fh2())
        .await
        .unwrap()
        .unwrap();
    let err = waylines.waylines(&RequestContext::new()).await.unwrap_err();
    match err {
        DroneGateError::Business { code, message } => {
            assert_eq!(code, 5001);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_uuid_never_reaches_the_cloud() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let registry = registry(&server).await;
    let tasks = registry
        .resolve_as::<dyn FlightTaskApi>(&fh2())
        .await
        .unwrap()
        .unwrap();
    let err = tasks
        .flight_task_media(&RequestContext::new(), "../../admin")
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn disabled_vendor_is_not_found_and_flight_control_was_never_offered() {
    let server = MockServer::start().await;
    let registry = registry(&server).await;

    assert!(
        registry
            .resolve(&fh2(), CapabilityKey::FlightControl)
            .await
            .unwrap()
            .is_none()
    );

    registry.disable(&fh2());
    assert!(
        registry
            .resolve_as::<dyn ProjectApi>(&fh2())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn capabilities_share_one_adapter_until_disabled() {
    let server = MockServer::start().await;
    let registry = registry(&server).await;

    let projects = registry
        .resolve(&fh2(), CapabilityKey::Projects)
        .await
        .unwrap()
        .unwrap();
    let waylines = registry
        .resolve(&fh2(), CapabilityKey::Waylines)
        .await
        .unwrap()
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(projects.adapter(), waylines.adapter()));
    assert_eq!(registry.live_adapters().len(), 1);

    registry.disable(&fh2());
    registry.enable(&fh2());
    let rebuilt = registry
        .resolve(&fh2(), CapabilityKey::Projects)
        .await
        .unwrap()
        .unwrap();
    assert!(!std::sync::Arc::ptr_eq(projects.adapter(), rebuilt.adapter()));
}
