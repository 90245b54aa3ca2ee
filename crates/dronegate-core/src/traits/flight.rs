// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-key take-off and landing.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::DroneGateError;
use crate::traits::adapter::DroneAdapter;
use crate::types::CommandReceipt;

#[async_trait]
pub trait FlightControl: DroneAdapter {
    /// Sends the take-off-to-point command to the gateway.
    async fn takeoff(&self, ctx: &RequestContext) -> Result<CommandReceipt, DroneGateError>;

    /// Sends the land command to the gateway.
    async fn land(&self, ctx: &RequestContext) -> Result<CommandReceipt, DroneGateError>;
}
