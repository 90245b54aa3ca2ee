// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dronegate plugins` command implementation.
//!
//! Shows which vendors this configuration registers, their lifecycle status
//! after the `[plugins]` lists are applied, and the built-in vendor catalog.

use std::sync::Arc;

use dronegate_config::DroneGateConfig;
use dronegate_core::DroneGateError;
use dronegate_plugin::{
    CapabilityRegistry, PluginDescriptor, VendorManifest, apply_plugin_config, search_catalog,
};
use dronegate_transport::MemoryBroker;
use serde::Serialize;

use crate::serve::register_vendors;

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct PluginsReport {
    pub registered: Vec<PluginDescriptor>,
    /// Vendors named in `[plugins]` that nothing registered.
    pub missing: Vec<String>,
    pub catalog: Vec<VendorManifest>,
}

/// Registers the configured vendors without building any capability.
pub fn collect_report(config: &DroneGateConfig, search: Option<&str>) -> Result<PluginsReport, DroneGateError> {
    let registry = CapabilityRegistry::new();
    register_vendors(&registry, config, Arc::new(MemoryBroker::new()))?;
    let lifecycle = apply_plugin_config(&registry, &config.plugins);

    Ok(PluginsReport {
        registered: registry.list(),
        missing: lifecycle.missing.iter().map(|v| v.to_string()).collect(),
        catalog: search_catalog(search.unwrap_or_default()),
    })
}

/// Run the `dronegate plugins` command.
pub fn run_plugins(config: &DroneGateConfig, json: bool, search: Option<&str>) -> Result<(), DroneGateError> {
    let report = collect_report(config, search)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    println!("Registered vendors:");
    if report.registered.is_empty() {
        println!("  (none configured)");
    }
    for descriptor in &report.registered {
        let keys: Vec<String> = descriptor.capabilities.iter().map(|k| k.to_string()).collect();
        println!(
            "  {:<12} {:<10} {}",
            descriptor.vendor,
            descriptor.status.to_string(),
            keys.join(", ")
        );
    }
    for vendor in &report.missing {
        println!("  {vendor:<12} not registered (listed in [plugins] but not configured)");
    }

    println!();
    println!("Catalog:");
    if report.catalog.is_empty() {
        println!("  no vendors match {:?}", search.unwrap_or_default());
    }
    for manifest in &report.catalog {
        println!("  {}", format_manifest(manifest));
    }
    Ok(())
}

fn format_manifest(manifest: &VendorManifest) -> String {
    let marker = if manifest.implemented { "" } else { " [not available in this build]" };
    let keys = if manifest.config_keys.is_empty() {
        String::new()
    } else {
        format!(" (needs {})", manifest.config_keys.join(", "))
    };
    format!(
        "{:<12} {:<8} {}{keys}{marker}",
        manifest.vendor, manifest.transport, manifest.description
    )
}

#[cfg(test)]
mod tests {
    use dronegate_core::LifecycleStatus;
    use dronegate_plugin::builtin_catalog;
    use dronegate_test_utils::test_config;

    use super::*;

    #[test]
    fn report_reflects_plugin_lists() {
        let mut config = test_config();
        config.plugins.enabled = vec!["fh2".into()];
        config.plugins.disabled = vec!["dji_pilot".into()];

        let report = collect_report(&config, None).unwrap();
        assert_eq!(report.registered.len(), 2);
        let fh2 = report
            .registered
            .iter()
            .find(|d| d.vendor.as_str() == "fh2")
            .unwrap();
        assert_eq!(fh2.status, LifecycleStatus::Enabled);
        assert_eq!(fh2.live_instances, 0);
        assert_eq!(report.missing, vec!["dji_pilot".to_string()]);
        assert_eq!(report.catalog.len(), builtin_catalog().len());
    }

    #[test]
    fn search_narrows_catalog() {
        let report = collect_report(&test_config(), Some("flighthub")).unwrap();
        assert_eq!(report.catalog.len(), 1);
        assert_eq!(report.catalog[0].vendor, "fh2");
    }

    #[test]
    fn unimplemented_vendors_are_marked() {
        let pilot = builtin_catalog()
            .into_iter()
            .find(|m| !m.implemented)
            .unwrap();
        assert!(format_manifest(&pilot).ends_with("[not available in this build]"));
    }

    #[test]
    fn report_serializes() {
        let report = collect_report(&test_config(), None).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["catalog"][1]["transport"], "rest");
        assert!(value["registered"].as_array().is_some());
    }
}
