// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a mistyped key is
//! rejected at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Dronegate configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DroneGateConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Which vendor plugins to enable, disable, or unload at startup.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Token lifetime and refresh cadence.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// DJI application credentials and dock identifiers.
    #[serde(default)]
    pub dji: DjiConfig,

    /// Broker connection used by gateway adapters.
    #[serde(default)]
    pub mqtt: MqttConfig,

    /// FlightHub 2 OpenAPI settings.
    #[serde(default)]
    pub fh2: Fh2Config,

    /// Outbound HTTP security policy.
    #[serde(default)]
    pub security: SecurityConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Value of the `X-Language` header on REST calls.
    #[serde(default = "default_language")]
    pub language: String,

    /// Default deadline applied to outbound REST calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            language: default_language(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_language() -> String {
    "zh".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Startup lifecycle lists, applied in order: enable, disable, unload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    #[serde(default)]
    pub enabled: Vec<String>,

    #[serde(default)]
    pub disabled: Vec<String>,

    #[serde(default)]
    pub unloaded: Vec<String>,
}

/// Token lifetime and refresh cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Interval between background refresh checks, in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Refresh when the token expires within this many seconds.
    #[serde(default = "default_refresh_threshold_secs")]
    pub refresh_threshold_secs: u64,

    /// Declared lifetime of tokens issued by vendor auth endpoints, in seconds.
    #[serde(default = "default_token_expires_in_secs")]
    pub token_expires_in_secs: u64,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_threshold_secs: default_refresh_threshold_secs(),
            token_expires_in_secs: default_token_expires_in_secs(),
        }
    }
}

impl CredentialsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_expires_in_secs)
    }
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_refresh_threshold_secs() -> u64 {
    300
}

fn default_token_expires_in_secs() -> u64 {
    7200
}

/// DJI application credentials and dock identifiers.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DjiConfig {
    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub app_key: String,

    #[serde(default)]
    pub app_license: Option<String>,

    /// Token endpoint; queried as `{auth_url}?appId=..&appKey=..`.
    #[serde(default)]
    pub auth_url: Option<String>,

    /// Serial number of the MQTT gateway that receives commands.
    #[serde(default)]
    pub gateway_sn: String,

    /// Serial number of the dock whose telemetry is subscribed.
    #[serde(default)]
    pub dock_sn: String,

    /// Broker client id for the dock connection.
    #[serde(default)]
    pub client_id: String,

    /// Live stream push address.
    #[serde(default)]
    pub rtmp_url: Option<String>,
}

/// Broker connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MqttConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_mqtt_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_mqtt_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl MqttConfig {
    /// Broker URL in `tcp://host:port` form.
    pub fn broker_url(&self) -> String {
        format!("tcp://{}:{}", self.host, self.port)
    }
}

fn default_mqtt_port() -> u16 {
    1883
}

/// FlightHub 2 OpenAPI settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Fh2Config {
    /// Base URL of the OpenAPI host, e.g. `https://fh.example.com`.
    #[serde(default)]
    pub host: Option<String>,

    /// Default project search query.
    #[serde(default)]
    pub q: String,

    /// Organization user token used when a call carries no tenant context.
    #[serde(default)]
    pub user_token: Option<String>,

    /// Default project scope used when a call carries no tenant context.
    #[serde(default)]
    pub project_uuid: Option<String>,

    /// Items per page for list endpoints.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Fh2Config {
    fn default() -> Self {
        Self {
            host: None,
            q: String::new(),
            user_token: None,
            project_uuid: None,
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

/// Outbound HTTP security policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Require HTTPS for every non-localhost endpoint.
    #[serde(default = "default_require_tls")]
    pub require_tls: bool,

    /// Private IP addresses exempt from SSRF blocking (e.g. an on-premise FH2).
    #[serde(default)]
    pub allowed_private_ips: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_tls: default_require_tls(),
            allowed_private_ips: Vec::new(),
        }
    }
}

fn default_require_tls() -> bool {
    true
}
