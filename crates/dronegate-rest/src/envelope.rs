// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `{code, message, data}` envelope returned by cloud OpenAPIs.

use dronegate_core::DroneGateError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

/// Decode a response body: `code > 0` is a business error, anything else
/// yields `data` unchanged.
pub fn decode_envelope(body: &[u8]) -> Result<Value, DroneGateError> {
    let envelope: ApiEnvelope = serde_json::from_slice(body)
        .map_err(|e| DroneGateError::decode("malformed response envelope", e))?;

    if envelope.code > 0 {
        return Err(DroneGateError::Business {
            code: envelope.code,
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}
