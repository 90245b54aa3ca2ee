// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection settings for one dock, extracted from the `[dji]`, `[mqtt]` and
//! `[credentials]` sections.

use std::time::Duration;

use dronegate_auth::CredentialPolicy;
use dronegate_config::DroneGateConfig;
use dronegate_core::{ConnectOptions, DroneGateError};

#[derive(Debug, Clone)]
pub struct Dock2Settings {
    pub app_id: String,
    pub app_key: String,
    pub auth_url: String,
    pub gateway_sn: String,
    pub dock_sn: String,
    pub client_id: String,
    pub rtmp_url: Option<String>,
    pub broker_url: String,
    pub mqtt_username: String,
    pub mqtt_password: String,
    pub refresh_interval: Duration,
    pub policy: CredentialPolicy,
}

impl Dock2Settings {
    pub fn from_config(config: &DroneGateConfig) -> Result<Self, DroneGateError> {
        let dji = &config.dji;
        let auth_url = dji
            .auth_url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DroneGateError::Config("dji.auth_url is not set".to_string()))?;
        for (name, value) in [
            ("dji.gateway_sn", &dji.gateway_sn),
            ("dji.dock_sn", &dji.dock_sn),
            ("mqtt.host", &config.mqtt.host),
        ] {
            if value.is_empty() {
                return Err(DroneGateError::Config(format!("{name} is not set")));
            }
        }

        let client_id = if dji.client_id.is_empty() {
            format!("dronegate-{}", dji.dock_sn)
        } else {
            dji.client_id.clone()
        };

        Ok(Self {
            app_id: dji.app_id.clone(),
            app_key: dji.app_key.clone(),
            auth_url,
            gateway_sn: dji.gateway_sn.clone(),
            dock_sn: dji.dock_sn.clone(),
            client_id,
            rtmp_url: dji.rtmp_url.clone().filter(|u| !u.is_empty()),
            broker_url: config.mqtt.broker_url(),
            mqtt_username: config.mqtt.username.clone(),
            mqtt_password: config.mqtt.password.clone(),
            refresh_interval: config.credentials.refresh_interval(),
            policy: CredentialPolicy::from(&config.credentials),
        })
    }

    /// Broker options for the dock's single connection.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            broker_url: self.broker_url.clone(),
            client_id: self.client_id.clone(),
            username: self.mqtt_username.clone(),
            password: self.mqtt_password.clone(),
            clean_session: true,
            auto_reconnect: true,
        }
    }
}
