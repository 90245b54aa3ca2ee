// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use dronegate_config::DroneGateConfig;
use dronegate_core::DroneGateError;

/// FlightHub 2 endpoint and organisation defaults from `[fh2]` and `[gateway]`.
#[derive(Debug, Clone)]
pub struct Fh2Settings {
    pub host: String,
    /// Default project search filter.
    pub q: String,
    /// Organisation token used when a call carries no tenant.
    pub user_token: Option<String>,
    pub project_uuid: Option<String>,
    pub page_size: u32,
    pub language: String,
    pub request_timeout: Duration,
}

impl Fh2Settings {
    pub fn from_config(config: &DroneGateConfig) -> Result<Self, DroneGateError> {
        let fh2 = &config.fh2;
        let host = fh2
            .host
            .clone()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DroneGateError::Config("fh2.host is not set".to_string()))?;

        Ok(Self {
            host,
            q: fh2.q.clone(),
            user_token: fh2.user_token.clone().filter(|t| !t.is_empty()),
            project_uuid: fh2.project_uuid.clone().filter(|p| !p.is_empty()),
            page_size: fh2.page_size,
            language: config.gateway.language.clone(),
            request_timeout: config.gateway.request_timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_required() {
        let config = DroneGateConfig::default();
        assert!(matches!(
            Fh2Settings::from_config(&config),
            Err(DroneGateError::Config(_))
        ));
    }

    #[test]
    fn empty_optionals_become_none() {
        let mut config = DroneGateConfig::default();
        config.fh2.host = Some("https://fh.example.com".into());
        config.fh2.user_token = Some(String::new());
        let settings = Fh2Settings::from_config(&config).unwrap();
        assert!(settings.user_token.is_none());
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.language, "zh");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
    }
}
