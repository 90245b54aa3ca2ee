// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DJI Dock 2 adapter.
//!
//! One adapter owns one broker connection, one credential manager, one
//! telemetry cache and the background tasks feeding them. All of it is bound
//! to the instance's cancellation token: cancelling it stops the refresh
//! scheduler and the telemetry pump and disconnects the transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dronegate_auth::{CredentialManager, RefreshScheduler, TokenSource};
use dronegate_core::{
    CommandReceipt, DroneAdapter, DroneGateError, FlightControl, HealthStatus,
    LiveStream, PubSubTransport, RequestContext, TelemetryReader, TelemetrySnapshot,
    TransportConnector, VendorType,
};
use dronegate_transport::{
    CommandEnvelope, TelemetryCache, osd_topic, service_topic, spawn_telemetry_pump,
};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::settings::Dock2Settings;

const TAKEOFF_METHOD: &str = "takeoff_to_point";
const LAND_METHOD: &str = "land_to_point";

pub struct Dock2Adapter {
    name: String,
    vendor: VendorType,
    settings: Arc<Dock2Settings>,
    transport: Arc<dyn PubSubTransport>,
    credentials: Arc<CredentialManager>,
    telemetry: Arc<TelemetryCache>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Dock2Adapter {
    /// Prime credentials, connect, subscribe to the dock's OSD topic and
    /// start the background tasks.
    ///
    /// On failure nothing is left running: the token is primed before
    /// connecting, and a failed subscribe disconnects again.
    pub async fn connect(
        settings: Arc<Dock2Settings>,
        connector: &dyn TransportConnector,
        tokens: Arc<dyn TokenSource>,
        cancel: CancellationToken,
    ) -> Result<Arc<Self>, DroneGateError> {
        let vendor = VendorType::from(VendorType::DJI_DOCK2);

        let credentials = Arc::new(CredentialManager::new(vendor.clone(), tokens, settings.policy));
        credentials.ensure_fresh().await?;

        let options = settings.connect_options();
        let transport = connector.connect(&options).await?;

        let topic = osd_topic(&settings.dock_sn);
        let subscription = match transport.subscribe(&topic).await {
            Ok(subscription) => subscription,
            Err(e) => {
                if let Err(close) = transport.disconnect().await {
                    debug!(error = %close, "disconnect after failed subscribe");
                }
                return Err(e);
            }
        };

        let telemetry = Arc::new(TelemetryCache::new());
        let pump = spawn_telemetry_pump(subscription, telemetry.clone(), cancel.clone());
        let scheduler =
            RefreshScheduler::spawn(credentials.clone(), settings.refresh_interval, cancel.clone());
        let watcher = tokio::spawn({
            let transport = transport.clone();
            let cancel = cancel.clone();
            let client_id = options.client_id.clone();
            async move {
                cancel.cancelled().await;
                if let Err(e) = transport.disconnect().await {
                    warn!(client_id = %client_id, error = %e, "transport disconnect failed");
                }
            }
        });

        info!(
            dock_sn = %settings.dock_sn,
            gateway_sn = %settings.gateway_sn,
            client_id = %options.client_id,
            "dock2 adapter connected"
        );

        Ok(Arc::new(Self {
            name: format!("dji-dock2:{}", settings.dock_sn),
            vendor,
            settings,
            transport,
            credentials,
            telemetry,
            cancel,
            tasks: Mutex::new(vec![pump, scheduler, watcher]),
        }))
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    pub fn telemetry_cache(&self) -> &Arc<TelemetryCache> {
        &self.telemetry
    }

    async fn send_command(
        &self,
        ctx: &RequestContext,
        operation: &str,
        method: &str,
    ) -> Result<CommandReceipt, DroneGateError> {
        if self.cancel.is_cancelled() {
            return Err(DroneGateError::Cancelled);
        }

        let client_token = self.credentials.current_token();
        let envelope = CommandEnvelope::new(
            method,
            json!({ "sn": self.settings.gateway_sn }),
            client_token.clone(),
        );
        let payload = envelope.to_payload()?;
        let body = String::from_utf8_lossy(&payload).into_owned();
        let topic = service_topic(&self.settings.gateway_sn, operation);

        ctx.run(self.transport.publish(&topic, payload)).await?;
        info!(topic = %topic, method, "command published");

        Ok(CommandReceipt {
            topic,
            method: method.to_string(),
            client_token,
            payload: body,
        })
    }
}

#[async_trait]
impl DroneAdapter for Dock2Adapter {
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
        if self.credentials.current_token().is_empty() {
            return Ok(HealthStatus::Unhealthy("no access token".to_string()));
        }
        if self.credentials.time_to_expiry().await.is_some_and(|left| left.is_zero()) {
            return Ok(HealthStatus::Degraded("access token expired".to_string()));
        }
        if self.telemetry.latest().is_none() {
            return Ok(HealthStatus::Degraded("no telemetry received yet".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DroneGateError> {
        self.cancel.cancel();
        let tasks: Vec<_> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for task in tasks {
            if let Err(e) = task.await {
                warn!(adapter = %self.name, error = %e, "background task ended abnormally");
            }
        }
        debug!(adapter = %self.name, "dock2 adapter shut down");
        Ok(())
    }
}

#[async_trait]
impl FlightControl for Dock2Adapter {
    async fn takeoff(&self, ctx: &RequestContext) -> Result<CommandReceipt, DroneGateError> {
        self.send_command(ctx, "takeoff", TAKEOFF_METHOD).await
    }

    async fn land(&self, ctx: &RequestContext) -> Result<CommandReceipt, DroneGateError> {
        self.send_command(ctx, "land", LAND_METHOD).await
    }
}

impl TelemetryReader for Dock2Adapter {
    fn latest_telemetry(&self) -> Option<TelemetrySnapshot> {
        self.telemetry.latest()
    }
}

#[async_trait]
impl LiveStream for Dock2Adapter {
    async fn live_stream_url(&self) -> Result<String, DroneGateError> {
        self.settings
            .rtmp_url
            .clone()
            .ok_or_else(|| DroneGateError::Config("dji.rtmp_url is not set".to_string()))
    }
}

impl std::fmt::Debug for Dock2Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dock2Adapter")
            .field("name", &self.name)
            .field("gateway_sn", &self.settings.gateway_sn)
            .finish_non_exhaustive()
    }
}
