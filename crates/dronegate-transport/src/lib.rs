// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pub/sub plumbing shared by gateway adapters.
//!
//! Topic naming and the command envelope follow the device-gateway
//! convention (`thing/product/{sn}/services/{operation}`). The
//! [`TelemetryCache`] keeps the latest decoded device state, fed by a
//! [`spawn_telemetry_pump`] task per subscription. [`MemoryBroker`] is an
//! in-process [`TransportConnector`](dronegate_core::TransportConnector).

pub mod envelope;
pub mod memory;
pub mod telemetry;
pub mod topic;

pub use envelope::CommandEnvelope;
pub use memory::{MemoryBroker, MemoryConnection};
pub use telemetry::{TelemetryCache, spawn_telemetry_pump};
pub use topic::{osd_topic, service_topic};
