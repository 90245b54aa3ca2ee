// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability registry, vendor lifecycle, and the built-in vendor catalog.
//!
//! Vendor crates register one [`CapabilityFactory`] per capability they
//! provide. Callers resolve typed capability instances by vendor and
//! [`CapabilityKey`](dronegate_core::CapabilityKey); the registry builds them
//! on first use, caches them while the vendor stays enabled, and tears them
//! down when it is disabled or unloaded.

pub mod capability;
pub mod catalog;
pub mod lifecycle;
pub mod registry;

pub use capability::{AdapterCell, Capability, CapabilityFactory, CapabilityHandle, CapabilityInstance, FactoryContext};
pub use catalog::{TransportKind, VendorManifest, builtin_catalog, search_catalog};
pub use lifecycle::{LifecycleReport, apply_plugin_config};
pub use registry::{CapabilityRegistry, PluginDescriptor};
