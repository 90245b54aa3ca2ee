// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dronegate serve` command implementation.
//!
//! Registers every vendor this build ships, applies the `[plugins]` lists,
//! builds the enabled capabilities up front and then keeps them alive until
//! SIGINT/SIGTERM, when every instance is torn down.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use dronegate_config::DroneGateConfig;
use dronegate_core::{DroneGateError, HealthStatus, LifecycleStatus, TransportConnector, VendorType};
use dronegate_dock2::register_dock2;
use dronegate_fh2::register_fh2;
use dronegate_plugin::{CapabilityRegistry, apply_plugin_config};
use dronegate_security::RedactingWriter;
use dronegate_transport::MemoryBroker;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::shutdown;

const HEALTH_INTERVAL: Duration = Duration::from_secs(60);

/// Register the built-in vendors.
///
/// A vendor whose settings are missing or rejected is skipped, unless the
/// configuration enables it, in which case the error is returned.
pub fn register_vendors(
    registry: &CapabilityRegistry,
    config: &DroneGateConfig,
    connector: Arc<dyn TransportConnector>,
) -> Result<Vec<VendorType>, DroneGateError> {
    let attempts = [
        (VendorType::DJI_DOCK2, register_dock2(registry, config, connector)),
        (VendorType::FH2, register_fh2(registry, config)),
    ];

    let mut registered = Vec::new();
    for (vendor, result) in attempts {
        match result {
            Ok(()) => registered.push(VendorType::from(vendor)),
            Err(e) if config.plugins.enabled.iter().any(|v| v == vendor) => {
                error!(vendor, error = %e, "enabled vendor could not be registered");
                return Err(e);
            }
            Err(e) => debug!(vendor, error = %e, "vendor not configured, skipping"),
        }
    }
    Ok(registered)
}

/// Build every capability of every enabled vendor so connection and
/// credential problems show up at startup. Failures are logged; the vendor
/// stays enabled and the next resolve retries.
pub async fn warm_up(registry: &CapabilityRegistry) -> usize {
    let mut ready = 0;
    for descriptor in registry.list() {
        if descriptor.status != LifecycleStatus::Enabled {
            continue;
        }
        for key in &descriptor.capabilities {
            match registry.resolve(&descriptor.vendor, *key).await {
                Ok(Some(_)) => ready += 1,
                Ok(None) => debug!(vendor = %descriptor.vendor, capability = %key, "capability no longer available"),
                Err(e) => warn!(
                    vendor = %descriptor.vendor,
                    capability = %key,
                    error = %e,
                    "capability failed to start"
                ),
            }
        }
    }
    ready
}

/// Log the health of every adapter currently built. Nothing is built here,
/// so a vendor nobody has resolved yet is not reported.
pub async fn check_health(registry: &CapabilityRegistry) -> Vec<(VendorType, HealthStatus)> {
    let mut results = Vec::new();
    for (vendor, adapter) in registry.live_adapters() {
        let status = match adapter.health_check().await {
            Ok(status) => status,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        };
        match &status {
            HealthStatus::Healthy => debug!(vendor = %vendor, adapter = adapter.name(), "healthy"),
            HealthStatus::Degraded(reason) => {
                warn!(vendor = %vendor, adapter = adapter.name(), reason = %reason, "degraded")
            }
            HealthStatus::Unhealthy(reason) => {
                error!(vendor = %vendor, adapter = adapter.name(), reason = %reason, "unhealthy")
            }
        }
        results.push((vendor, status));
    }
    results
}

/// Runs the `dronegate serve` command.
pub async fn run_serve(config: DroneGateConfig) -> Result<(), DroneGateError> {
    init_tracing(&config.gateway.log_level, configured_secrets(&config));

    // The network MQTT client lives outside this workspace; without one the
    // dock gateway is served by the in-process broker.
    warn!("no network pub/sub client linked, dock commands go to the in-process broker");
    let connector: Arc<dyn TransportConnector> = Arc::new(MemoryBroker::new());

    let registry = Arc::new(CapabilityRegistry::new());
    let registered = register_vendors(&registry, &config, connector)?;
    info!(vendors = ?registered, "vendor factories registered");

    let report = apply_plugin_config(&registry, &config.plugins);
    info!(
        enabled = ?report.enabled,
        disabled = ?report.disabled,
        unloaded = ?report.unloaded,
        "plugin configuration applied"
    );

    let ready = warm_up(&registry).await;
    info!(ready, "capability instances started");

    let cancel = shutdown::install_signal_handler();
    let monitor = tokio::spawn(health_monitor(registry.clone(), cancel.clone()));

    cancel.cancelled().await;
    if let Err(e) = monitor.await {
        warn!(error = %e, "health monitor ended abnormally");
    }
    registry.shutdown().await;

    info!("dronegate serve shutdown complete");
    Ok(())
}

async fn health_monitor(registry: Arc<CapabilityRegistry>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(HEALTH_INTERVAL);
    // Skip the first immediate tick.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                check_health(&registry).await;
            }
            _ = cancel.cancelled() => {
                info!("health monitor shutting down");
                break;
            }
        }
    }
}

/// Secrets from configuration that must never reach the log output.
fn configured_secrets(config: &DroneGateConfig) -> Vec<String> {
    [
        Some(config.dji.app_key.clone()),
        config.dji.app_license.clone(),
        Some(config.mqtt.password.clone()),
        config.fh2.user_token.clone(),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect()
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str, secrets: Vec<String>) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dronegate={log_level},warn")));
    let secrets = Arc::new(RwLock::new(secrets));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(move || RedactingWriter::new(std::io::stderr(), secrets.clone()))
        .init();
}

#[cfg(test)]
mod tests {
    use dronegate_core::CapabilityKey;
    use dronegate_test_utils::test_config;

    use super::*;

    #[test]
    fn secrets_skip_empty_values() {
        let mut config = test_config();
        config.mqtt.password = String::new();
        let secrets = configured_secrets(&config);
        assert_eq!(secrets, vec!["key-test".to_string(), "fh2-org-token".to_string()]);
    }

    #[test]
    fn unconfigured_vendors_are_skipped() {
        let registry = CapabilityRegistry::new();
        let registered =
            register_vendors(&registry, &DroneGateConfig::default(), Arc::new(MemoryBroker::new()))
                .unwrap();
        assert!(registered.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn enabled_vendor_with_rejected_settings_is_fatal() {
        let mut config = test_config();
        config.security.require_tls = true;
        config.fh2.host = Some("http://fh.example.com".into());
        config.plugins.enabled = vec!["fh2".into()];
        let registry = CapabilityRegistry::new();
        let err = register_vendors(&registry, &config, Arc::new(MemoryBroker::new())).unwrap_err();
        assert!(matches!(err, DroneGateError::Security(_)));
    }

    #[tokio::test]
    async fn both_vendors_register_from_test_config() {
        let registry = CapabilityRegistry::new();
        let registered = register_vendors(&registry, &test_config(), Arc::new(MemoryBroker::new()))
            .unwrap();
        assert_eq!(registered.len(), 2);
        assert_eq!(registry.list()[0].vendor.as_str(), "dji_dock2");
        assert_eq!(registry.list()[1].capabilities.len(), 3);
        // Nothing is enabled, so nothing is built.
        assert_eq!(warm_up(&registry).await, 0);
        assert!(check_health(&registry).await.is_empty());
    }

    #[tokio::test]
    async fn health_check_reports_built_adapters_without_building() {
        let registry = CapabilityRegistry::new();
        register_vendors(&registry, &test_config(), Arc::new(MemoryBroker::new())).unwrap();
        let fh2 = VendorType::from(VendorType::FH2);
        registry.enable(&fh2);

        assert!(check_health(&registry).await.is_empty());
        assert_eq!(registry.list()[1].live_instances, 0);

        registry.resolve(&fh2, CapabilityKey::Projects).await.unwrap().unwrap();
        registry.resolve(&fh2, CapabilityKey::Waylines).await.unwrap().unwrap();
        let report = check_health(&registry).await;
        assert_eq!(report.len(), 1);
        assert_eq!(report[0], (fh2.clone(), HealthStatus::Healthy));
        assert_eq!(registry.list()[1].live_instances, 2);
    }
}
