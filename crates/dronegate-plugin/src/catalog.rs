// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in vendor catalog.
//!
//! Static descriptions of the vendors this build knows about, used by
//! `dronegate plugins` to show what each vendor offers and which settings it
//! needs, whether or not it is registered at runtime.

use dronegate_core::{CapabilityKey, VendorType};
use serde::Serialize;

/// How an adapter reaches its vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransportKind {
    /// Authenticated REST calls with the `{code, message, data}` envelope.
    Rest,
    /// Commands and telemetry over a device gateway's pub/sub topics.
    PubSub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorManifest {
    pub vendor: &'static str,
    pub description: &'static str,
    pub transport: TransportKind,
    pub capabilities: &'static [CapabilityKey],
    /// Settings that must be present when the vendor is enabled.
    pub config_keys: &'static [&'static str],
    /// False for vendors with a manifest but no adapter in this build.
    pub implemented: bool,
}

pub fn builtin_catalog() -> Vec<VendorManifest> {
    vec![
        VendorManifest {
            vendor: VendorType::DJI_DOCK2,
            description: "DJI Dock 2 through its MQTT gateway",
            transport: TransportKind::PubSub,
            capabilities: &[
                CapabilityKey::FlightControl,
                CapabilityKey::Telemetry,
                CapabilityKey::LiveStream,
            ],
            config_keys: &["dji.auth_url", "dji.gateway_sn", "dji.dock_sn", "mqtt.host"],
            implemented: true,
        },
        VendorManifest {
            vendor: VendorType::FH2,
            description: "DJI FlightHub 2 OpenAPI",
            transport: TransportKind::Rest,
            capabilities: &[
                CapabilityKey::Projects,
                CapabilityKey::FlightTasks,
                CapabilityKey::Waylines,
            ],
            config_keys: &["fh2.host"],
            implemented: true,
        },
        VendorManifest {
            vendor: VendorType::DJI_PILOT,
            description: "DJI Pilot 2 cloud integration",
            transport: TransportKind::PubSub,
            capabilities: &[CapabilityKey::FlightControl, CapabilityKey::Telemetry],
            config_keys: &[],
            implemented: false,
        },
    ]
}

/// Catalog entries whose vendor name or description contains `query`
/// (case-insensitive). An empty query returns everything.
pub fn search_catalog(query: &str) -> Vec<VendorManifest> {
    let query = query.to_lowercase();
    builtin_catalog()
        .into_iter()
        .filter(|m| {
            query.is_empty()
                || m.vendor.contains(&query)
                || m.description.to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_known_vendors() {
        let vendors: Vec<&str> = builtin_catalog().iter().map(|m| m.vendor).collect();
        assert_eq!(vendors, ["dji_dock2", "fh2", "dji_pilot"]);
    }

    #[test]
    fn search_matches_description() {
        let hits = search_catalog("flighthub");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vendor, "fh2");
        assert_eq!(search_catalog("").len(), 3);
        assert!(search_catalog("parrot").is_empty());
    }

    #[test]
    fn transport_kind_displays_snake_case() {
        assert_eq!(TransportKind::PubSub.to_string(), "pub_sub");
    }
}
