// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-zero intervals, known plugin
//! names, and the settings each enabled vendor needs to start.

use std::collections::HashSet;

use dronegate_core::VendorType;

use crate::diagnostic::{ConfigError, suggest_key};
use crate::model::DroneGateConfig;

/// Vendor names the gateway ships adapters or manifests for.
pub const KNOWN_VENDORS: &[&str] = &[
    VendorType::DJI_DOCK2,
    VendorType::FH2,
    VendorType::DJI_PILOT,
];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &DroneGateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let creds = &config.credentials;
    for (name, value) in [
        ("credentials.refresh_interval_secs", creds.refresh_interval_secs),
        ("credentials.token_expires_in_secs", creds.token_expires_in_secs),
        ("gateway.request_timeout_secs", config.gateway.request_timeout_secs),
    ] {
        if value == 0 {
            errors.push(validation(format!("{name} must be greater than 0")));
        }
    }

    if config.fh2.page_size == 0 {
        errors.push(validation("fh2.page_size must be greater than 0".to_string()));
    }

    let lists = [
        ("plugins.enabled", &config.plugins.enabled),
        ("plugins.disabled", &config.plugins.disabled),
        ("plugins.unloaded", &config.plugins.unloaded),
    ];
    for (list_name, names) in lists {
        for name in names {
            if !KNOWN_VENDORS.contains(&name.as_str()) {
                let message = match suggest_key(name, KNOWN_VENDORS) {
                    Some(s) => format!("{list_name} contains unknown vendor `{name}`, did you mean `{s}`?"),
                    None => format!(
                        "{list_name} contains unknown vendor `{name}` (known: {})",
                        KNOWN_VENDORS.join(", ")
                    ),
                };
                errors.push(validation(message));
            }
        }
    }

    let disabled: HashSet<&str> = config.plugins.disabled.iter().map(String::as_str).collect();
    for name in &config.plugins.enabled {
        if disabled.contains(name.as_str()) {
            errors.push(validation(format!(
                "vendor `{name}` is listed in both plugins.enabled and plugins.disabled"
            )));
        }
    }

    if is_enabled(config, VendorType::DJI_DOCK2) {
        if config.dji.auth_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            errors.push(validation(
                "dji.auth_url is required when dji_dock2 is enabled".to_string(),
            ));
        }
        for (name, value) in [
            ("dji.gateway_sn", &config.dji.gateway_sn),
            ("dji.dock_sn", &config.dji.dock_sn),
            ("mqtt.host", &config.mqtt.host),
        ] {
            if value.trim().is_empty() {
                errors.push(validation(format!(
                    "{name} is required when dji_dock2 is enabled"
                )));
            }
        }
    }

    if is_enabled(config, VendorType::FH2)
        && config.fh2.host.as_deref().is_none_or(|h| h.trim().is_empty())
    {
        errors.push(validation(
            "fh2.host is required when fh2 is enabled".to_string(),
        ));
    }

    for ip in &config.security.allowed_private_ips {
        if ip.parse::<std::net::IpAddr>().is_err() {
            errors.push(validation(format!(
                "security.allowed_private_ips entry `{ip}` is not a valid IP address"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_enabled(config: &DroneGateConfig, vendor: &str) -> bool {
    config.plugins.enabled.iter().any(|v| v == vendor)
}

fn validation(message: String) -> ConfigError {
    ConfigError::Validation { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&DroneGateConfig::default()).is_ok());
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let mut config = DroneGateConfig::default();
        config.credentials.refresh_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("refresh_interval_secs"));
    }

    #[test]
    fn unknown_vendor_gets_suggestion() {
        let mut config = DroneGateConfig::default();
        config.plugins.disabled = vec!["dji_dok2".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("did you mean `dji_dock2`"));
    }

    #[test]
    fn enabled_dock2_requires_connection_settings() {
        let mut config = DroneGateConfig::default();
        config.plugins.enabled = vec!["dji_dock2".to_string()];
        let errors = validate_config(&config).unwrap_err();
        // auth_url, gateway_sn, dock_sn, mqtt.host
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn vendor_cannot_be_enabled_and_disabled() {
        let mut config = DroneGateConfig::default();
        config.plugins.enabled = vec!["fh2".to_string()];
        config.plugins.disabled = vec!["fh2".to_string()];
        config.fh2.host = Some("https://fh.example.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("both"));
    }

    #[test]
    fn parsed_fh2_section_satisfies_enabled_vendor() {
        let toml_str = r#"
            [plugins]
            enabled = ["fh2"]

            [fh2]
            host = "https://fh.example.com"
            user_token = "org-token"
        "#;
        let config: DroneGateConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn blank_fh2_host_is_rejected() {
        let toml_str = r#"
            [plugins]
            enabled = ["fh2"]

            [fh2]
            host = "  "
        "#;
        let config: DroneGateConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("fh2.host"));
    }

    #[test]
    fn misspelled_section_key_fails_to_parse() {
        let toml_str = r#"
            [mqtt]
            hots = "broker.local"
        "#;
        assert!(toml::from_str::<DroneGateConfig>(toml_str).is_err());
    }
}
