// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, the vendor adapters, and the transports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Identifier of a drone-cloud provider or gateway integration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorType(String);

impl VendorType {
    /// DJI Dock 2, reached through an MQTT gateway.
    pub const DJI_DOCK2: &'static str = "dji_dock2";
    /// DJI FlightHub 2 cloud OpenAPI.
    pub const FH2: &'static str = "fh2";
    /// DJI Pilot 2 cloud integration.
    pub const DJI_PILOT: &'static str = "dji_pilot";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VendorType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VendorType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Named, typed capability interface a vendor adapter may implement.
///
/// Each key maps to exactly one trait in [`crate::traits`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum CapabilityKey {
    /// Take-off and landing commands ([`crate::FlightControl`]).
    FlightControl,
    /// Cached device telemetry ([`crate::TelemetryReader`]).
    Telemetry,
    /// Live video stream address ([`crate::LiveStream`]).
    LiveStream,
    /// Organization projects and devices ([`crate::ProjectApi`]).
    Projects,
    /// Flight task creation and device commands ([`crate::FlightTaskApi`]).
    FlightTasks,
    /// Wayline management ([`crate::WaylineApi`]).
    Waylines,
}

/// Lifecycle status of a registered vendor plugin.
///
/// `Registered -> Enabled <-> Disabled -> Unloaded`. `Unloaded` is terminal and
/// is only observable transiently: the registry drops the descriptor right after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Registered,
    Enabled,
    Disabled,
    Unloaded,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Geographic position reported by a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Latitude: {:.6}, Longitude: {:.6}, Altitude: {:.6}",
            self.latitude, self.longitude, self.altitude
        )
    }
}

/// Most recent device-state snapshot received over a telemetry subscription.
///
/// `received_at` is stamped locally when the payload is decoded; it is never
/// read from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub battery: i32,
    pub speed: f64,
    pub flight_state: i32,
    #[serde(skip_deserializing, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl TelemetrySnapshot {
    pub fn position(&self) -> Position {
        Position {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
        }
    }
}

/// Result of publishing a command to a device gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReceipt {
    /// Topic the command was published on.
    pub topic: String,
    /// Service method name (e.g. `takeoff_to_point`).
    pub method: String,
    /// Access token the command was authorised with.
    pub client_token: String,
    /// Serialized JSON payload exactly as published.
    pub payload: String,
}
