// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every vendor adapter instance.

use async_trait::async_trait;

use crate::error::DroneGateError;
use crate::types::{HealthStatus, VendorType};

/// A live adapter instance bound to one vendor connection.
///
/// `shutdown` must be idempotent: the registry may call it for an instance
/// that has already been torn down through its cancellation token.
#[async_trait]
pub trait DroneAdapter: Send + Sync + 'static {
    /// Human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Vendor type this adapter was built for.
    fn vendor(&self) -> &VendorType;

    /// Reports whether the adapter's connection and credentials are usable.
    async fn health_check(&self) -> Result<HealthStatus, DroneGateError>;

    /// Stops background tasks and releases the transport connection.
    async fn shutdown(&self) -> Result<(), DroneGateError>;
}
