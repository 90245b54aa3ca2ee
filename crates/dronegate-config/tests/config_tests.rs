// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Dronegate configuration system.

use dronegate_config::diagnostic::ConfigError;
use dronegate_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_config_deserializes() {
    let toml = r#"
[gateway]
log_level = "debug"
language = "en"
request_timeout_secs = 10

[plugins]
enabled = ["dji_dock2", "fh2"]

[credentials]
refresh_interval_secs = 60
refresh_threshold_secs = 120
token_expires_in_secs = 3600

[dji]
app_id = "app-1"
app_key = "key-1"
auth_url = "https://auth.example.com/token"
gateway_sn = "GW-001"
dock_sn = "DOCK-001"
client_id = "dronegate-1"
rtmp_url = "rtmp://live.example.com/app/stream"

[mqtt]
host = "broker.example.com"
port = 8883
username = "user"
password = "pass"

[fh2]
host = "https://fh.example.com"
q = "survey"
user_token = "org-token"
project_uuid = "2a7a4f8e-6c35-4a5e-9b1e-0c1d2e3f4a5b"

[security]
require_tls = true
allowed_private_ips = ["10.0.0.5"]
"#;

    let config = load_and_validate_str(toml).expect("config should be valid");
    assert_eq!(config.gateway.log_level, "debug");
    assert_eq!(config.gateway.request_timeout().as_secs(), 10);
    assert_eq!(config.plugins.enabled, vec!["dji_dock2", "fh2"]);
    assert_eq!(config.credentials.refresh_interval().as_secs(), 60);
    assert_eq!(config.dji.dock_sn, "DOCK-001");
    assert_eq!(config.mqtt.broker_url(), "tcp://broker.example.com:8883");
    assert_eq!(config.fh2.host.as_deref(), Some("https://fh.example.com"));
    assert_eq!(config.fh2.page_size, 10);
    assert_eq!(config.security.allowed_private_ips, vec!["10.0.0.5"]);
}

#[test]
fn empty_config_uses_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.gateway.language, "zh");
    assert_eq!(config.credentials.refresh_threshold_secs, 300);
    assert_eq!(config.credentials.token_expires_in_secs, 7200);
    assert_eq!(config.mqtt.port, 1883);
    assert!(config.security.require_tls);
    assert!(config.plugins.enabled.is_empty());
}

#[test]
fn unknown_key_reports_suggestion_and_span() {
    let toml = "[dji]\ngatway_sn = \"GW-001\"\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "gatway_sn");
            assert_eq!(suggestion.as_deref(), Some("gateway_sn"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telemetry]\nenabled = true\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[mqtt]\nport = \"not-a-number\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn validation_collects_every_error() {
    let toml = r#"
[plugins]
enabled = ["fh2", "dji_dock"]

[credentials]
refresh_interval_secs = 0
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(errors.len(), 3, "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("refresh_interval_secs")));
    assert!(messages.iter().any(|m| m.contains("did you mean `dji_dock2`")));
    assert!(messages.iter().any(|m| m.contains("fh2.host")));
}
