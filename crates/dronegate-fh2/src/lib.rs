// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DJI FlightHub 2 vendor integration over its OpenAPI.

pub mod adapter;
pub mod factory;
pub mod settings;

pub use adapter::Fh2Adapter;
pub use factory::{FH2_CAPABILITIES, Fh2Factory, register_fh2, register_fh2_with};
pub use settings::Fh2Settings;
