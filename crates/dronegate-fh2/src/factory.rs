// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use dronegate_config::DroneGateConfig;
use dronegate_core::{CapabilityKey, DroneGateError, VendorType};
use dronegate_plugin::{
    AdapterCell, CapabilityFactory, CapabilityInstance, CapabilityRegistry, FactoryContext,
};
use dronegate_security::{build_secure_client, validate_url};
use tracing::info;

use crate::adapter::Fh2Adapter;
use crate::settings::Fh2Settings;

pub const FH2_CAPABILITIES: &[CapabilityKey] = &[
    CapabilityKey::Projects,
    CapabilityKey::FlightTasks,
    CapabilityKey::Waylines,
];

/// Serves every FlightHub 2 capability from one adapter per vendor lifetime.
pub struct Fh2Factory {
    settings: Arc<Fh2Settings>,
    http: reqwest::Client,
    adapter: AdapterCell<Fh2Adapter>,
}

impl Fh2Factory {
    pub fn new(settings: Fh2Settings, http: reqwest::Client) -> Self {
        Self {
            settings: Arc::new(settings),
            http,
            adapter: AdapterCell::new(),
        }
    }
}

#[async_trait]
impl CapabilityFactory for Fh2Factory {
    async fn build(&self, ctx: FactoryContext) -> Result<CapabilityInstance, DroneGateError> {
        let adapter = self
            .adapter
            .get_or_try_init(&ctx, || async {
                Ok(Arc::new(Fh2Adapter::new(
                    self.settings.clone(),
                    self.http.clone(),
                    ctx.cancellation().clone(),
                )))
            })
            .await?;
        match ctx.key() {
            CapabilityKey::Projects => Ok(CapabilityInstance::projects(adapter)),
            CapabilityKey::FlightTasks => Ok(CapabilityInstance::flight_tasks(adapter)),
            CapabilityKey::Waylines => Ok(CapabilityInstance::waylines(adapter)),
            other => Err(DroneGateError::Internal(format!("fh2 does not provide {other}"))),
        }
    }
}

/// Register FlightHub 2 against the configured host through the secure client.
pub fn register_fh2(registry: &CapabilityRegistry, config: &DroneGateConfig) -> Result<(), DroneGateError> {
    let settings = Fh2Settings::from_config(config)?;
    validate_url(&config.security, &settings.host)?;
    let http = build_secure_client(&config.security)?;
    register_fh2_with(registry, settings, http);
    Ok(())
}

/// Register FlightHub 2 with a caller-supplied HTTP client.
pub fn register_fh2_with(registry: &CapabilityRegistry, settings: Fh2Settings, http: reqwest::Client) {
    let host = settings.host.clone();
    let factory: Arc<dyn CapabilityFactory> = Arc::new(Fh2Factory::new(settings, http));
    let vendor = VendorType::from(VendorType::FH2);
    for key in FH2_CAPABILITIES {
        registry.register_arc(vendor.clone(), *key, factory.clone());
    }
    info!(host = %host, "fh2 capabilities registered");
}
