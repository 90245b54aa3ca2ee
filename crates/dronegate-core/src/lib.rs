// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Dronegate multi-vendor drone-cloud integration layer.
//!
//! This crate provides the capability traits every vendor adapter implements,
//! the shared error type, per-call request context, and the transport traits
//! that gateway adapters consume.

pub mod context;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use context::{RequestContext, TenantContext};
pub use error::DroneGateError;
pub use types::{
    CapabilityKey, CommandReceipt, HealthStatus, LifecycleStatus, Position, TelemetrySnapshot,
    VendorType,
};

// Re-export all capability traits at crate root.
pub use traits::{
    ConnectOptions, DroneAdapter, FlightControl, FlightTaskApi, LiveStream, ProjectApi,
    PubSubTransport, Subscription, TelemetryReader, TransportConnector, WaylineApi,
};
