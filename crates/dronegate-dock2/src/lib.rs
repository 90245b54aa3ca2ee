// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DJI Dock 2 vendor integration.
//!
//! The dock is reached through a pub/sub gateway. Commands are published on
//! `thing/product/{gateway_sn}/services/{operation}`; telemetry arrives on the
//! dock's OSD topic and is kept in a per-instance cache.

pub mod adapter;
pub mod factory;
pub mod settings;

pub use adapter::Dock2Adapter;
pub use factory::{DOCK2_CAPABILITIES, Dock2Factory, register_dock2, register_dock2_with};
pub use settings::Dock2Settings;
