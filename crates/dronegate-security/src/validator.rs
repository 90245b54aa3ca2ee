// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier and parameter checks run before any vendor call.
//!
//! Every failure is a [`DroneGateError::Validation`], so callers can tell a
//! rejected input apart from a network or API failure.

use std::sync::LazyLock;

use dronegate_core::DroneGateError;
use regex::Regex;

const MAX_DEVICE_SN_LEN: usize = 35;
const MAX_PROJECT_NAME_LEN: usize = 35;
const MAX_QUERY_PARAM_LEN: usize = 100;

static DEVICE_SN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid device SN regex"));

/// Stateless validator for vendor identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_uuid(&self, value: &str) -> Result<(), DroneGateError> {
        if value.is_empty() {
            return Err(invalid("UUID must not be empty"));
        }
        uuid::Uuid::parse_str(value)
            .map(|_| ())
            .map_err(|_| invalid(format!("invalid UUID format: {value}")))
    }

    /// Device serials are at most 35 characters of `[A-Za-z0-9_-]`.
    pub fn validate_device_sn(&self, sn: &str) -> Result<(), DroneGateError> {
        if sn.is_empty() {
            return Err(invalid("device SN must not be empty"));
        }
        if sn.chars().count() > MAX_DEVICE_SN_LEN {
            return Err(invalid(format!(
                "device SN exceeds {MAX_DEVICE_SN_LEN} characters"
            )));
        }
        if !DEVICE_SN.is_match(sn) {
            return Err(invalid(format!("invalid device SN format: {sn}")));
        }
        Ok(())
    }

    pub fn validate_device_sns(&self, sns: &[String]) -> Result<(), DroneGateError> {
        if sns.is_empty() {
            return Err(invalid("device SN list must not be empty"));
        }
        sns.iter().try_for_each(|sn| self.validate_device_sn(sn))
    }

    pub fn validate_project_name(&self, name: &str) -> Result<(), DroneGateError> {
        if name.trim().is_empty() {
            return Err(invalid("project name must not be empty"));
        }
        if name.chars().count() > MAX_PROJECT_NAME_LEN {
            return Err(invalid(format!(
                "project name exceeds {MAX_PROJECT_NAME_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Query parameters must be non-empty, at most 100 characters, and any
    /// `%` must start a valid percent-encoded byte.
    pub fn validate_query_param(&self, value: &str) -> Result<(), DroneGateError> {
        if value.is_empty() {
            return Err(invalid("query parameter must not be empty"));
        }
        if value.chars().count() > MAX_QUERY_PARAM_LEN {
            return Err(invalid(format!(
                "query parameter exceeds {MAX_QUERY_PARAM_LEN} characters"
            )));
        }
        if !is_valid_percent_encoding(value) {
            return Err(invalid(format!("invalid URL encoding in query parameter: {value}")));
        }
        Ok(())
    }
}

fn is_valid_percent_encoding(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

fn invalid(message: impl Into<String>) -> DroneGateError {
    DroneGateError::Validation(message.into())
}
