// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token source backed by a vendor's HTTP auth endpoint.

use std::time::Duration;

use async_trait::async_trait;
use dronegate_core::DroneGateError;
use serde::Deserialize;
use tracing::debug;

use crate::credential::{IssuedToken, TokenSource};

/// Fetches tokens with `GET {auth_url}?appId=..&appKey=..`.
pub struct HttpTokenSource {
    client: reqwest::Client,
    auth_url: String,
    app_id: String,
    app_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl HttpTokenSource {
    pub fn new(
        client: reqwest::Client,
        auth_url: impl Into<String>,
        app_id: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
            app_id: app_id.into(),
            app_key: app_key.into(),
        }
    }

    fn request_url(&self) -> Result<url::Url, DroneGateError> {
        let mut url = url::Url::parse(&self.auth_url)
            .map_err(|e| DroneGateError::Config(format!("invalid auth URL `{}`: {e}", self.auth_url)))?;
        url.query_pairs_mut()
            .append_pair("appId", &self.app_id)
            .append_pair("appKey", &self.app_key);
        Ok(url)
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch(&self) -> Result<IssuedToken, DroneGateError> {
        let url = self.request_url()?;
        debug!(endpoint = %self.auth_url, "requesting access token");

        let response = self.client.get(url).send().await.map_err(|e| DroneGateError::Auth {
            message: format!("token request to {} failed", self.auth_url),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DroneGateError::Auth {
                message: format!("token endpoint returned HTTP {}", status.as_u16()),
                source: None,
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| DroneGateError::Auth {
            message: "malformed token response".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(IssuedToken {
            access_token: body.access_token,
            refresh_token: body.refresh_token.filter(|t| !t.is_empty()),
            expires_in: body.expires_in.filter(|s| *s > 0).map(Duration::from_secs),
        })
    }
}
