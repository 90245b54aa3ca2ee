// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to cached device telemetry.

use crate::traits::adapter::DroneAdapter;
use crate::types::{Position, TelemetrySnapshot};

/// Adapter that keeps a telemetry subscription open and caches the latest snapshot.
///
/// Reads never touch the network. `None` means no snapshot has been received yet.
pub trait TelemetryReader: DroneAdapter {
    fn latest_telemetry(&self) -> Option<TelemetrySnapshot>;

    fn location(&self) -> Option<Position> {
        self.latest_telemetry().map(|s| s.position())
    }

    fn battery_level(&self) -> Option<i32> {
        self.latest_telemetry().map(|s| s.battery)
    }
}
