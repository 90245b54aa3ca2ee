// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live video stream addressing.

use async_trait::async_trait;

use crate::error::DroneGateError;
use crate::traits::adapter::DroneAdapter;

#[async_trait]
pub trait LiveStream: DroneAdapter {
    /// Returns the URL the device pushes its live stream to.
    async fn live_stream_url(&self) -> Result<String, DroneGateError>;
}
