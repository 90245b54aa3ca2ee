// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FlightHub 2 OpenAPI adapter.
//!
//! Every identifier is validated before a request is built. Responses are
//! returned as the envelope's `data` value; callers pick the fields they need.

use std::sync::Arc;

use async_trait::async_trait;
use dronegate_auth::CredentialManager;
use dronegate_core::{
    DroneAdapter, DroneGateError, FlightTaskApi, HealthStatus, ProjectApi, RequestContext,
    VendorType, WaylineApi,
};
use dronegate_rest::{RestClient, RestRequest};
use dronegate_security::InputValidator;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::settings::Fh2Settings;

const API_PREFIX: &str = "/openapi/v0.1";

pub struct Fh2Adapter {
    name: String,
    vendor: VendorType,
    settings: Arc<Fh2Settings>,
    client: RestClient,
    validator: InputValidator,
    cancel: CancellationToken,
}

impl Fh2Adapter {
    pub fn new(settings: Arc<Fh2Settings>, http: reqwest::Client, cancel: CancellationToken) -> Self {
        let vendor = VendorType::from(VendorType::FH2);
        let mut client = RestClient::new(http, settings.host.clone(), settings.language.clone())
            .with_default_project(settings.project_uuid.clone())
            .with_request_timeout(settings.request_timeout);
        if let Some(token) = &settings.user_token {
            client = client.with_credentials(Arc::new(CredentialManager::with_static_token(
                vendor.clone(),
                token.clone(),
            )));
        }

        Self {
            name: format!("fh2:{}", settings.host),
            vendor,
            settings,
            client,
            validator: InputValidator::new(),
            cancel,
        }
    }

    async fn call(&self, ctx: &RequestContext, request: RestRequest) -> Result<Value, DroneGateError> {
        if self.cancel.is_cancelled() {
            return Err(DroneGateError::Cancelled);
        }
        debug!(method = %request.method(), path = request.path(), "fh2 call");
        self.client.execute(ctx, request).await
    }

    /// Validates `value` in the form it takes on the wire.
    fn check_query(&self, value: &str) -> Result<(), DroneGateError> {
        let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
        self.validator.validate_query_param(&encoded)
    }

    fn check_body(body: &Value, what: &str) -> Result<(), DroneGateError> {
        if body.is_object() {
            Ok(())
        } else {
            Err(DroneGateError::Validation(format!("{what} must be a JSON object")))
        }
    }
}

fn endpoint(path: &str) -> String {
    format!("{API_PREFIX}/{path}")
}

#[async_trait]
impl DroneAdapter for Fh2Adapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn vendor(&self) -> &VendorType {
        &self.vendor
    }

    async fn health_check(&self) -> Result<HealthStatus, DroneGateError> {
        if self.cancel.is_cancelled() {
            return Ok(HealthStatus::Unhealthy("adapter shut down".to_string()));
        }
        if self.settings.user_token.is_none() {
            return Ok(HealthStatus::Degraded(
                "no organisation token; calls need a tenant context".to_string(),
            ));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DroneGateError> {
        self.cancel.cancel();
        Ok(())
    }
}

#[async_trait]
impl ProjectApi for Fh2Adapter {
    async fn projects(&self, ctx: &RequestContext, query: Option<&str>) -> Result<Value, DroneGateError> {
        let q = query.unwrap_or(&self.settings.q);
        let mut request = RestRequest::get(endpoint("project"))
            .query("page", "1")
            .query("page_size", self.settings.page_size.to_string());
        if !q.is_empty() {
            self.check_query(q)?;
            request = request.query("q", q);
        }
        let request = request
            .query("prj_authorized_status", "project-status-authorized")
            .query("usage", "simple")
            .query("sort_column", "created_at")
            .query("sort_type", "ASC");
        self.call(ctx, request).await
    }

    async fn devices(&self, ctx: &RequestContext) -> Result<Value, DroneGateError> {
        self.call(ctx, RestRequest::get(endpoint("project/device"))).await
    }

    async fn device_state(&self, ctx: &RequestContext, device_sn: &str) -> Result<Value, DroneGateError> {
        self.validator.validate_device_sn(device_sn)?;
        self.call(ctx, RestRequest::get(endpoint(&format!("device/{device_sn}/state"))))
            .await
    }

    async fn device_hms(&self, ctx: &RequestContext, device_sns: &[String]) -> Result<Value, DroneGateError> {
        self.validator.validate_device_sns(device_sns)?;
        let list = device_sns.join(",");
        self.check_query(&list)?;
        self.call(
            ctx,
            RestRequest::get(endpoint("device/hms")).query("device_sn_list", list),
        )
        .await
    }

    async fn project_sts_token(&self, ctx: &RequestContext) -> Result<Value, DroneGateError> {
        self.call(ctx, RestRequest::get(endpoint("project/sts-token"))).await
    }
}

#[async_trait]
impl FlightTaskApi for Fh2Adapter {
    async fn create_flight_task(&self, ctx: &RequestContext, task: &Value) -> Result<Value, DroneGateError> {
        Self::check_body(task, "flight task")?;
        self.call(ctx, RestRequest::post(endpoint("flight-task")).json(task.clone()))
            .await
    }

    async fn flight_task(&self, ctx: &RequestContext, task_uuid: &str) -> Result<Value, DroneGateError> {
        self.validator.validate_uuid(task_uuid)?;
        self.call(ctx, RestRequest::get(endpoint(&format!("flight-task/{task_uuid}"))))
            .await
    }

    async fn update_flight_task_status(
        &self,
        ctx: &RequestContext,
        task_uuid: &str,
        status: &Value,
    ) -> Result<Value, DroneGateError> {
        self.validator.validate_uuid(task_uuid)?;
        Self::check_body(status, "task status")?;
        self.call(
            ctx,
            RestRequest::put(endpoint(&format!("flight-task/{task_uuid}/status"))).json(status.clone()),
        )
        .await
    }

    async fn flight_task_media(&self, ctx: &RequestContext, task_uuid: &str) -> Result<Value, DroneGateError> {
        self.validator.validate_uuid(task_uuid)?;
        self.call(ctx, RestRequest::get(endpoint(&format!("flight-task/{task_uuid}/media"))))
            .await
    }

    async fn flight_task_track(&self, ctx: &RequestContext, task_uuid: &str) -> Result<Value, DroneGateError> {
        self.validator.validate_uuid(task_uuid)?;
        self.call(ctx, RestRequest::get(endpoint(&format!("flight-task/{task_uuid}/track"))))
            .await
    }

    async fn device_command(
        &self,
        ctx: &RequestContext,
        device_sn: &str,
        command: &Value,
    ) -> Result<Value, DroneGateError> {
        self.validator.validate_device_sn(device_sn)?;
        Self::check_body(command, "device command")?;
        self.call(
            ctx,
            RestRequest::post(endpoint(&format!("device/{device_sn}/command"))).json(command.clone()),
        )
        .await
    }
}

#[async_trait]
impl WaylineApi for Fh2Adapter {
    async fn waylines(&self, ctx: &RequestContext) -> Result<Value, DroneGateError> {
        self.call(ctx, RestRequest::get(endpoint("wayline"))).await
    }

    async fn wayline(&self, ctx: &RequestContext, wayline_uuid: &str) -> Result<Value, DroneGateError> {
        self.validator.validate_uuid(wayline_uuid)?;
        self.call(ctx, RestRequest::get(endpoint(&format!("wayline/{wayline_uuid}"))))
            .await
    }

    async fn finish_upload(
        &self,
        ctx: &RequestContext,
        object_key: &str,
        file_name: &str,
    ) -> Result<Value, DroneGateError> {
        if object_key.trim().is_empty() {
            return Err(DroneGateError::Validation("object key must not be empty".to_string()));
        }
        if file_name.trim().is_empty() {
            return Err(DroneGateError::Validation("file name must not be empty".to_string()));
        }
        let body = json!({ "name": file_name, "object_key": object_key });
        self.call(ctx, RestRequest::post(endpoint("wayline/finish-upload")).json(body))
            .await
    }
}

impl std::fmt::Debug for Fh2Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fh2Adapter")
            .field("name", &self.name)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> Fh2Adapter {
        let settings = Fh2Settings {
            host: "https://fh.example.com".into(),
            q: String::new(),
            user_token: None,
            project_uuid: None,
            page_size: 10,
            language: "zh".into(),
            request_timeout: std::time::Duration::from_secs(5),
        };
        Fh2Adapter::new(Arc::new(settings), reqwest::Client::new(), CancellationToken::new())
    }

    #[tokio::test]
    async fn bad_identifiers_fail_before_any_request() {
        let fh2 = adapter();
        let ctx = RequestContext::new();
        assert!(fh2.device_state(&ctx, "bad sn!").await.unwrap_err().is_validation());
        assert!(fh2.flight_task(&ctx, "not-a-uuid").await.unwrap_err().is_validation());
        assert!(fh2.wayline(&ctx, "").await.unwrap_err().is_validation());
        assert!(fh2.device_hms(&ctx, &[]).await.unwrap_err().is_validation());
        assert!(
            fh2.create_flight_task(&ctx, &json!(["not", "an", "object"]))
                .await
                .unwrap_err()
                .is_validation()
        );
        assert!(fh2.finish_upload(&ctx, "", "a.kmz").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn overlong_query_is_rejected() {
        let fh2 = adapter();
        let q = "x".repeat(101);
        let err = fh2.projects(&RequestContext::new(), Some(&q)).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn without_token_health_is_degraded_and_calls_fail_auth() {
        let fh2 = adapter();
        assert!(matches!(
            fh2.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
        let err = fh2.devices(&RequestContext::new()).await.unwrap_err();
        assert!(matches!(err, DroneGateError::Auth { .. }));
    }

    #[tokio::test]
    async fn shut_down_adapter_refuses_calls() {
        let fh2 = adapter();
        fh2.shutdown().await.unwrap();
        assert!(matches!(
            fh2.waylines(&RequestContext::new()).await,
            Err(DroneGateError::Cancelled)
        ));
    }
}
