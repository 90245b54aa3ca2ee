// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON envelope for commands published to a device gateway.

use chrono::Utc;
use dronegate_core::DroneGateError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{method, params, timestamp, clientToken}` as published on a service topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    pub method: String,
    pub params: Value,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    pub client_token: String,
}

impl CommandEnvelope {
    /// Envelope stamped with the current time.
    pub fn new(method: impl Into<String>, params: Value, client_token: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params,
            timestamp: Utc::now().timestamp_millis(),
            client_token: client_token.into(),
        }
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, DroneGateError> {
        serde_json::to_vec(self).map_err(|e| DroneGateError::Internal(format!("failed to encode command: {e}")))
    }
}
