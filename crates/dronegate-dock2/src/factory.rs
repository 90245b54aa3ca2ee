// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration of the dock2 capabilities.

use std::sync::Arc;

use async_trait::async_trait;
use dronegate_auth::{HttpTokenSource, TokenSource};
use dronegate_config::DroneGateConfig;
use dronegate_core::{CapabilityKey, DroneGateError, TransportConnector, VendorType};
use dronegate_plugin::{
    AdapterCell, CapabilityFactory, CapabilityInstance, CapabilityRegistry, FactoryContext,
};
use dronegate_security::{build_secure_client, validate_url};
use tracing::info;

use crate::adapter::Dock2Adapter;
use crate::settings::Dock2Settings;

/// Capabilities served by a dock.
pub const DOCK2_CAPABILITIES: &[CapabilityKey] = &[
    CapabilityKey::FlightControl,
    CapabilityKey::Telemetry,
    CapabilityKey::LiveStream,
];

/// Serves every dock capability from one connected [`Dock2Adapter`] per
/// vendor lifetime: one broker connection, one credential manager and one
/// OSD subscription however many capabilities are resolved.
pub struct Dock2Factory {
    settings: Arc<Dock2Settings>,
    connector: Arc<dyn TransportConnector>,
    tokens: Arc<dyn TokenSource>,
    adapter: AdapterCell<Dock2Adapter>,
}

impl Dock2Factory {
    pub fn new(
        settings: Dock2Settings,
        connector: Arc<dyn TransportConnector>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            connector,
            tokens,
            adapter: AdapterCell::new(),
        }
    }
}

#[async_trait]
impl CapabilityFactory for Dock2Factory {
    async fn build(&self, ctx: FactoryContext) -> Result<CapabilityInstance, DroneGateError> {
        let key = ctx.key();
        if !DOCK2_CAPABILITIES.contains(&key) {
            return Err(DroneGateError::Internal(format!(
                "dji_dock2 does not provide {key}"
            )));
        }

        let adapter = self
            .adapter
            .get_or_try_init(&ctx, || {
                Dock2Adapter::connect(
                    self.settings.clone(),
                    self.connector.as_ref(),
                    self.tokens.clone(),
                    ctx.cancellation().clone(),
                )
            })
            .await?;

        Ok(match key {
            CapabilityKey::FlightControl => CapabilityInstance::flight_control(adapter),
            CapabilityKey::Telemetry => CapabilityInstance::telemetry(adapter),
            _ => CapabilityInstance::live_stream(adapter),
        })
    }
}

/// Register dock2 using the configured auth endpoint.
///
/// The auth URL is checked against the security policy up front, so a plain
/// HTTP endpoint on a remote host fails here rather than on first resolve.
pub fn register_dock2(
    registry: &CapabilityRegistry,
    config: &DroneGateConfig,
    connector: Arc<dyn TransportConnector>,
) -> Result<(), DroneGateError> {
    let settings = Dock2Settings::from_config(config)?;
    validate_url(&config.security, &settings.auth_url)?;
    let client = build_secure_client(&config.security)?;
    let tokens = Arc::new(HttpTokenSource::new(
        client,
        settings.auth_url.clone(),
        settings.app_id.clone(),
        settings.app_key.clone(),
    ));
    register_dock2_with(registry, settings, connector, tokens);
    Ok(())
}

/// Register dock2 with an explicit token source.
pub fn register_dock2_with(
    registry: &CapabilityRegistry,
    settings: Dock2Settings,
    connector: Arc<dyn TransportConnector>,
    tokens: Arc<dyn TokenSource>,
) {
    let dock_sn = settings.dock_sn.clone();
    let factory: Arc<dyn CapabilityFactory> = Arc::new(Dock2Factory::new(settings, connector, tokens));
    let vendor = VendorType::from(VendorType::DJI_DOCK2);
    for key in DOCK2_CAPABILITIES {
        registry.register_arc(vendor.clone(), *key, factory.clone());
    }
    info!(dock_sn = %dock_sn, "dji_dock2 capabilities registered");
}
