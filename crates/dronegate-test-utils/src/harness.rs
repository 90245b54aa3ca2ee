// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry harness for end-to-end tests.
//!
//! `TestHarness` owns an empty [`CapabilityRegistry`], an in-process broker to
//! stand in for the dock gateway, and a [`MockTokenSource`]. Vendor crates
//! register their factories against it the same way the binary does.

use std::sync::Arc;

use dronegate_config::model::DroneGateConfig;
use dronegate_core::{TelemetrySnapshot, TransportConnector};
use dronegate_plugin::CapabilityRegistry;
use dronegate_transport::{CommandEnvelope, MemoryBroker, osd_topic};

use crate::mock_token::MockTokenSource;

pub const TEST_GATEWAY_SN: &str = "GW-TEST-01";
pub const TEST_DOCK_SN: &str = "DOCK-TEST-01";

/// Configuration with every vendor section filled in for local endpoints.
pub fn test_config() -> DroneGateConfig {
    let mut config = DroneGateConfig::default();
    config.dji.app_id = "app-test".into();
    config.dji.app_key = "key-test".into();
    config.dji.auth_url = Some("http://localhost:9/auth/token".into());
    config.dji.gateway_sn = TEST_GATEWAY_SN.into();
    config.dji.dock_sn = TEST_DOCK_SN.into();
    config.dji.client_id = "dronegate-test".into();
    config.dji.rtmp_url = Some("rtmp://localhost/live/dock".into());
    config.mqtt.host = "localhost".into();
    config.fh2.host = Some("http://localhost:9".into());
    config.fh2.user_token = Some("fh2-org-token".into());
    config.security.require_tls = false;
    config
}

pub struct TestHarness {
    pub registry: Arc<CapabilityRegistry>,
    pub broker: MemoryBroker,
    pub tokens: Arc<MockTokenSource>,
    pub config: DroneGateConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: DroneGateConfig) -> Self {
        Self {
            registry: Arc::new(CapabilityRegistry::new()),
            broker: MemoryBroker::new(),
            tokens: Arc::new(MockTokenSource::with_prefix("dock")),
            config,
        }
    }

    pub fn connector(&self) -> Arc<dyn TransportConnector> {
        Arc::new(self.broker.clone())
    }

    /// Publish `snapshot` on the dock's OSD topic, as the gateway would.
    ///
    /// Returns the number of live subscriptions that received it.
    pub async fn push_telemetry(&self, snapshot: &TelemetrySnapshot) -> usize {
        let payload = match serde_json::to_vec(snapshot) {
            Ok(payload) => payload,
            Err(_) => return 0,
        };
        self.broker
            .inject(&osd_topic(&self.config.dji.dock_sn), payload)
            .await
    }

    /// Commands published so far, with their topics.
    pub fn published_commands(&self) -> Vec<(String, CommandEnvelope)> {
        self.broker
            .published()
            .into_iter()
            .filter_map(|(topic, payload)| {
                serde_json::from_slice(&payload)
                    .ok()
                    .map(|envelope| (topic, envelope))
            })
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
