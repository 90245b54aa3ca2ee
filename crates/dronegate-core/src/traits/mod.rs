// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for vendor adapters.
//!
//! Every capability extends the [`DroneAdapter`] base trait and uses
//! `#[async_trait]` for dynamic dispatch through the registry.

pub mod adapter;
pub mod cloud;
pub mod flight;
pub mod stream;
pub mod telemetry;
pub mod transport;

pub use adapter::DroneAdapter;
pub use cloud::{FlightTaskApi, ProjectApi, WaylineApi};
pub use flight::FlightControl;
pub use stream::LiveStream;
pub use telemetry::TelemetryReader;
pub use transport::{ConnectOptions, PubSubTransport, Subscription, TransportConnector};
