// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Header injection checks applied before a request leaves the process.

use dronegate_core::DroneGateError;

pub const MAX_HEADER_KEY_LEN: usize = 100;
pub const MAX_HEADER_VALUE_LEN: usize = 1000;

/// Reject header names or values that could split the request or are oversized.
pub fn validate_header(key: &str, value: &str) -> Result<(), DroneGateError> {
    if key.is_empty() {
        return Err(DroneGateError::Security("empty header name".to_string()));
    }
    if key.len() > MAX_HEADER_KEY_LEN {
        return Err(DroneGateError::Security(format!(
            "header name exceeds {MAX_HEADER_KEY_LEN} bytes"
        )));
    }
    if value.len() > MAX_HEADER_VALUE_LEN {
        return Err(DroneGateError::Security(format!(
            "value of header `{key}` exceeds {MAX_HEADER_VALUE_LEN} bytes"
        )));
    }
    if has_line_break(key) || has_line_break(value) {
        return Err(DroneGateError::Security(format!(
            "header `{}` contains a line break",
            key.escape_debug()
        )));
    }
    Ok(())
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}
