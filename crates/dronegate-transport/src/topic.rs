// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Service topic of a device: `thing/product/{device_sn}/services/{operation}`.
pub fn service_topic(device_sn: &str, operation: &str) -> String {
    format!("thing/product/{device_sn}/services/{operation}")
}

/// Telemetry (OSD) topic of a device.
pub fn osd_topic(device_sn: &str) -> String {
    service_topic(device_sn, "osd")
}
