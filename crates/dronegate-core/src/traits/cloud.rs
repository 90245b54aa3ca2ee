// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud OpenAPI capabilities (projects, flight tasks, waylines).
//!
//! Successful calls return the envelope's `data` field verbatim.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::DroneGateError;
use crate::traits::adapter::DroneAdapter;

/// Organization, project, and device queries.
#[async_trait]
pub trait ProjectApi: DroneAdapter {
    /// Lists authorized projects, filtered by `query` (or the configured default).
    async fn projects(
        &self,
        ctx: &RequestContext,
        query: Option<&str>,
    ) -> Result<Value, DroneGateError>;

    /// Lists devices of the tenant's project.
    async fn devices(&self, ctx: &RequestContext) -> Result<Value, DroneGateError>;

    /// Fetches the thing-model state of one device.
    async fn device_state(
        &self,
        ctx: &RequestContext,
        device_sn: &str,
    ) -> Result<Value, DroneGateError>;

    /// Fetches HMS health messages for a set of devices.
    async fn device_hms(
        &self,
        ctx: &RequestContext,
        device_sns: &[String],
    ) -> Result<Value, DroneGateError>;

    /// Fetches the project's object-storage upload credentials.
    async fn project_sts_token(&self, ctx: &RequestContext) -> Result<Value, DroneGateError>;
}

/// Flight task lifecycle and real-time device commands.
#[async_trait]
pub trait FlightTaskApi: DroneAdapter {
    async fn create_flight_task(
        &self,
        ctx: &RequestContext,
        task: &Value,
    ) -> Result<Value, DroneGateError>;

    async fn flight_task(
        &self,
        ctx: &RequestContext,
        task_uuid: &str,
    ) -> Result<Value, DroneGateError>;

    /// Suspends or resumes a task (`{"status": ...}`).
    async fn update_flight_task_status(
        &self,
        ctx: &RequestContext,
        task_uuid: &str,
        status: &Value,
    ) -> Result<Value, DroneGateError>;

    async fn flight_task_media(
        &self,
        ctx: &RequestContext,
        task_uuid: &str,
    ) -> Result<Value, DroneGateError>;

    async fn flight_task_track(
        &self,
        ctx: &RequestContext,
        task_uuid: &str,
    ) -> Result<Value, DroneGateError>;

    /// Real-time control during a flight (return home, pause, resume...).
    async fn device_command(
        &self,
        ctx: &RequestContext,
        device_sn: &str,
        command: &Value,
    ) -> Result<Value, DroneGateError>;
}

/// Wayline listing and upload notification.
#[async_trait]
pub trait WaylineApi: DroneAdapter {
    async fn waylines(&self, ctx: &RequestContext) -> Result<Value, DroneGateError>;

    async fn wayline(
        &self,
        ctx: &RequestContext,
        wayline_uuid: &str,
    ) -> Result<Value, DroneGateError>;

    /// Notifies the cloud that a wayline file finished uploading to object storage.
    async fn finish_upload(
        &self,
        ctx: &RequestContext,
        object_key: &str,
        file_name: &str,
    ) -> Result<Value, DroneGateError>;
}
