// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Applies the `[plugins]` lists from configuration to a registry.

use dronegate_config::model::PluginsConfig;
use dronegate_core::VendorType;
use tracing::warn;

use crate::registry::CapabilityRegistry;

/// What a batch of lifecycle transitions actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleReport {
    pub enabled: Vec<VendorType>,
    pub disabled: Vec<VendorType>,
    pub unloaded: Vec<VendorType>,
    /// Names listed in configuration that no vendor crate registered.
    pub missing: Vec<VendorType>,
}

/// Enable, then disable, then unload the listed vendors.
///
/// Names that are not registered are reported in [`LifecycleReport::missing`]
/// and otherwise skipped.
pub fn apply_plugin_config(registry: &CapabilityRegistry, plugins: &PluginsConfig) -> LifecycleReport {
    let mut report = LifecycleReport::default();

    let passes: [(&[String], fn(&CapabilityRegistry, &VendorType) -> bool, &mut Vec<VendorType>); 3] = [
        (&plugins.enabled, CapabilityRegistry::enable, &mut report.enabled),
        (&plugins.disabled, CapabilityRegistry::disable, &mut report.disabled),
        (&plugins.unloaded, CapabilityRegistry::unload, &mut report.unloaded),
    ];

    let mut missing = Vec::new();
    for (names, transition, applied) in passes {
        for name in names {
            let vendor = VendorType::from(name.as_str());
            if transition(registry, &vendor) {
                applied.push(vendor);
            } else if !missing.contains(&vendor) {
                warn!(vendor = %vendor, "configured vendor is not registered");
                missing.push(vendor);
            }
        }
    }
    report.missing = missing;
    report
}

#[cfg(test)]
mod tests {
    use dronegate_core::{CapabilityKey, DroneGateError, LifecycleStatus};

    use super::*;
    use crate::capability::{CapabilityInstance, FactoryContext};

    fn registry_with(vendors: &[&str]) -> CapabilityRegistry {
        let registry = CapabilityRegistry::new();
        for vendor in vendors {
            registry.register(*vendor, CapabilityKey::Projects, |_ctx: FactoryContext| async {
                Err::<CapabilityInstance, _>(DroneGateError::Internal("not built in this test".into()))
            });
        }
        registry
    }

    #[test]
    fn applies_lists_in_order() {
        let registry = registry_with(&["dji_dock2", "fh2", "dji_pilot"]);
        let plugins = PluginsConfig {
            enabled: vec!["dji_dock2".into(), "fh2".into()],
            disabled: vec!["fh2".into()],
            unloaded: vec!["dji_pilot".into()],
        };

        let report = apply_plugin_config(&registry, &plugins);

        assert_eq!(report.enabled.len(), 2);
        assert_eq!(report.disabled, vec![VendorType::from("fh2")]);
        assert_eq!(report.unloaded, vec![VendorType::from("dji_pilot")]);
        assert!(report.missing.is_empty());
        assert_eq!(registry.status(&VendorType::from("dji_dock2")), Some(LifecycleStatus::Enabled));
        assert_eq!(registry.status(&VendorType::from("fh2")), Some(LifecycleStatus::Disabled));
        assert_eq!(registry.status(&VendorType::from("dji_pilot")), None);
    }

    #[test]
    fn unregistered_names_are_reported_once() {
        let registry = registry_with(&["fh2"]);
        let plugins = PluginsConfig {
            enabled: vec!["dji_dock2".into()],
            disabled: vec!["dji_dock2".into()],
            unloaded: vec![],
        };
        let report = apply_plugin_config(&registry, &plugins);
        assert_eq!(report.missing, vec![VendorType::from("dji_dock2")]);
        assert!(report.enabled.is_empty());
    }
}
