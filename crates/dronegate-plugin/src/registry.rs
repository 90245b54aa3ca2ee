// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability registry with per-vendor lifecycle.
//!
//! One table-wide lock guards every vendor entry. `resolve` looks up the
//! factory under the lock and releases it before building, so a slow
//! connection or token fetch never blocks other vendors. After the build the
//! entry is checked again: if the vendor left the `Enabled` state in the
//! meantime, the fresh instance is discarded instead of being handed out.
//!
//! Every instance of a vendor shares one lifetime: a cancellation token and
//! a generation number drawn from a registry-wide counter. Disable, unload
//! and shutdown cancel the token and start a new generation, so a build that
//! straddles them (including an unload followed by a fresh registration)
//! never ends up in the cache.
//!
//! Lifecycle: `Registered -> Enabled <-> Disabled -> Unloaded`. `Unloaded`
//! removes the entry, so a later lookup cannot tell it from a vendor that was
//! never registered, and registering again starts over at `Registered`.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dronegate_core::{CapabilityKey, DroneAdapter, DroneGateError, LifecycleStatus, VendorType};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capability::{Capability, CapabilityFactory, CapabilityInstance, FactoryContext};

/// Point-in-time view of one registered vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    pub vendor: VendorType,
    pub status: LifecycleStatus,
    pub capabilities: BTreeSet<CapabilityKey>,
    /// Capability instances currently built and cached.
    pub live_instances: usize,
}

struct VendorEntry {
    status: LifecycleStatus,
    factories: HashMap<CapabilityKey, Arc<dyn CapabilityFactory>>,
    live: HashMap<CapabilityKey, CapabilityInstance>,
    /// Lifetime shared by every cached instance of the vendor.
    lifetime: CancellationToken,
    generation: u64,
}

impl VendorEntry {
    fn new(generation: u64, lifetime: CancellationToken) -> Self {
        Self {
            status: LifecycleStatus::Registered,
            factories: HashMap::new(),
            live: HashMap::new(),
            lifetime,
            generation,
        }
    }

    /// End the current lifetime: cancel it, forget the cached instances and
    /// start a new generation.
    fn tear_down(&mut self, vendor: &VendorType, generation: u64, lifetime: CancellationToken) {
        for key in self.live.keys() {
            debug!(vendor = %vendor, capability = %key, "tearing down capability instance");
        }
        self.live.clear();
        self.lifetime.cancel();
        self.lifetime = lifetime;
        self.generation = generation;
    }
}

/// Registry of vendor capability factories and their live instances.
pub struct CapabilityRegistry {
    entries: RwLock<HashMap<VendorType, VendorEntry>>,
    root: CancellationToken,
    generations: AtomicU64,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            root: CancellationToken::new(),
            generations: AtomicU64::new(0),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<VendorType, VendorEntry>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<VendorType, VendorEntry>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register (or replace) the factory for `key` under `vendor`.
    ///
    /// An unknown vendor starts in `Registered`; an existing vendor keeps its
    /// status. A replaced factory does not affect an instance already built.
    pub fn register(
        &self,
        vendor: impl Into<VendorType>,
        key: CapabilityKey,
        factory: impl CapabilityFactory,
    ) {
        self.register_arc(vendor.into(), key, Arc::new(factory));
    }

    pub fn register_arc(&self, vendor: VendorType, key: CapabilityKey, factory: Arc<dyn CapabilityFactory>) {
        let mut entries = self.write();
        let entry = entries.entry(vendor.clone()).or_insert_with(|| {
            info!(vendor = %vendor, "vendor registered");
            VendorEntry::new(self.next_generation(), self.root.child_token())
        });
        if entry.factories.insert(key, factory).is_some() {
            debug!(vendor = %vendor, capability = %key, "capability factory replaced");
        } else {
            debug!(vendor = %vendor, capability = %key, "capability factory registered");
        }
    }

    /// Allow capabilities of `vendor` to be resolved. Returns false if the
    /// vendor is not registered.
    pub fn enable(&self, vendor: &VendorType) -> bool {
        let mut entries = self.write();
        let Some(entry) = entries.get_mut(vendor) else {
            warn!(vendor = %vendor, "enable ignored: vendor not registered");
            return false;
        };
        if entry.status != LifecycleStatus::Enabled {
            entry.status = LifecycleStatus::Enabled;
            info!(vendor = %vendor, "vendor enabled");
        }
        true
    }

    /// Stop resolving `vendor` and tear down its cached instances. The
    /// descriptor stays. Returns false if the vendor is not registered.
    pub fn disable(&self, vendor: &VendorType) -> bool {
        let mut entries = self.write();
        let Some(entry) = entries.get_mut(vendor) else {
            warn!(vendor = %vendor, "disable ignored: vendor not registered");
            return false;
        };
        entry.status = LifecycleStatus::Disabled;
        entry.tear_down(vendor, self.next_generation(), self.root.child_token());
        info!(vendor = %vendor, "vendor disabled");
        true
    }

    /// Tear down `vendor` and remove it. Returns false if it was not registered.
    pub fn unload(&self, vendor: &VendorType) -> bool {
        let mut entries = self.write();
        let Some(mut entry) = entries.remove(vendor) else {
            warn!(vendor = %vendor, "unload ignored: vendor not registered");
            return false;
        };
        entry.status = LifecycleStatus::Unloaded;
        entry.lifetime.cancel();
        entry.live.clear();
        info!(vendor = %vendor, "vendor unloaded");
        true
    }

    pub fn status(&self, vendor: &VendorType) -> Option<LifecycleStatus> {
        self.read().get(vendor).map(|e| e.status)
    }

    /// Resolve the capability `key` of `vendor`.
    ///
    /// `Ok(None)` when the vendor is unknown, not enabled, or lacks the key.
    /// A factory failure is returned as the error it produced.
    pub async fn resolve(
        &self,
        vendor: &VendorType,
        key: CapabilityKey,
    ) -> Result<Option<CapabilityInstance>, DroneGateError> {
        let (factory, generation, lifetime) = {
            let entries = self.read();
            let Some(entry) = entries.get(vendor) else {
                return Ok(None);
            };
            if entry.status != LifecycleStatus::Enabled {
                return Ok(None);
            }
            if let Some(instance) = entry.live.get(&key) {
                return Ok(Some(instance.clone()));
            }
            let Some(factory) = entry.factories.get(&key) else {
                return Ok(None);
            };
            (Arc::clone(factory), entry.generation, entry.lifetime.clone())
        };

        let ctx = FactoryContext::new(vendor.clone(), key, generation, lifetime);
        debug!(vendor = %vendor, capability = %key, generation, "building capability instance");

        let instance = match factory.build(ctx).await {
            Ok(instance) if instance.key() == key => instance,
            Ok(instance) => {
                return Err(DroneGateError::Internal(format!(
                    "factory for {vendor}/{key} built a {} instance",
                    instance.key()
                )));
            }
            Err(e) => {
                warn!(vendor = %vendor, capability = %key, error = %e, "capability factory failed");
                return Err(e);
            }
        };

        let mut entries = self.write();
        let Some(entry) = entries
            .get_mut(vendor)
            .filter(|e| e.status == LifecycleStatus::Enabled && e.generation == generation)
        else {
            // The lifetime the instance was built for has already been cancelled.
            info!(vendor = %vendor, capability = %key, "vendor left enabled state during build, instance discarded");
            return Ok(None);
        };

        if let Some(existing) = entry.live.get(&key) {
            // Another resolve won the race; keep the first instance.
            return Ok(Some(existing.clone()));
        }

        entry.live.insert(key, instance.clone());
        info!(vendor = %vendor, capability = %key, "capability instance ready");
        Ok(Some(instance))
    }

    /// Resolve a capability by its trait: `registry.resolve_as::<dyn FlightControl>(&vendor)`.
    pub async fn resolve_as<T: Capability + ?Sized>(
        &self,
        vendor: &VendorType,
    ) -> Result<Option<Arc<T>>, DroneGateError> {
        Ok(self
            .resolve(vendor, T::KEY)
            .await?
            .and_then(|instance| instance.get::<T>()))
    }

    /// Snapshot of every registered vendor, sorted by name.
    pub fn list(&self) -> Vec<PluginDescriptor> {
        let entries = self.read();
        let mut descriptors: Vec<PluginDescriptor> = entries
            .iter()
            .map(|(vendor, entry)| PluginDescriptor {
                vendor: vendor.clone(),
                status: entry.status,
                capabilities: entry.factories.keys().copied().collect(),
                live_instances: entry.live.len(),
            })
            .collect();
        descriptors.sort_by(|a, b| a.vendor.cmp(&b.vendor));
        descriptors
    }

    /// The distinct adapters behind every cached instance, one entry per
    /// adapter even when it serves several capabilities. Builds nothing.
    pub fn live_adapters(&self) -> Vec<(VendorType, Arc<dyn DroneAdapter>)> {
        let entries = self.read();
        let mut vendors: Vec<&VendorType> = entries.keys().collect();
        vendors.sort();
        let mut adapters = Vec::new();
        for vendor in vendors {
            if let Some(entry) = entries.get(vendor) {
                for instance in entry.live.values() {
                    push_distinct(&mut adapters, vendor, instance.adapter());
                }
            }
        }
        adapters
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Tear down every live instance and let each adapter release its resources.
    pub async fn shutdown(&self) {
        let adapters = self.live_adapters();
        {
            let mut entries = self.write();
            for (vendor, entry) in entries.iter_mut() {
                entry.tear_down(vendor, self.next_generation(), self.root.child_token());
            }
        }
        self.root.cancel();

        for (vendor, adapter) in adapters {
            if let Err(e) = adapter.shutdown().await {
                warn!(vendor = %vendor, adapter = adapter.name(), error = %e, "adapter shutdown failed");
            }
        }
        info!("capability registry shut down");
    }
}

fn push_distinct(
    adapters: &mut Vec<(VendorType, Arc<dyn DroneAdapter>)>,
    vendor: &VendorType,
    adapter: &Arc<dyn DroneAdapter>,
) {
    if !adapters.iter().any(|(_, seen)| Arc::ptr_eq(seen, adapter)) {
        adapters.push((vendor.clone(), Arc::clone(adapter)));
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("vendors", &self.list())
            .finish()
    }
}
