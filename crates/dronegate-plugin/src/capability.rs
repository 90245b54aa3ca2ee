// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed capability handles and the factories that build them.
//!
//! Each [`CapabilityKey`] corresponds to exactly one capability trait. A
//! [`CapabilityHandle`] carries the trait object for its key, and the
//! [`Capability`] trait lets callers go from a `dyn` capability type to its
//! key and back without any runtime type inspection.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use dronegate_core::{
    CapabilityKey, DroneAdapter, DroneGateError, FlightControl, FlightTaskApi, LiveStream,
    ProjectApi, TelemetryReader, VendorType, WaylineApi,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// What a factory gets to know about the instance it is building.
#[derive(Debug, Clone)]
pub struct FactoryContext {
    vendor: VendorType,
    key: CapabilityKey,
    generation: u64,
    cancel: CancellationToken,
}

impl FactoryContext {
    pub fn new(vendor: VendorType, key: CapabilityKey, generation: u64, cancel: CancellationToken) -> Self {
        Self {
            vendor,
            key,
            generation,
            cancel,
        }
    }

    pub fn vendor(&self) -> &VendorType {
        &self.vendor
    }

    pub fn key(&self) -> CapabilityKey {
        self.key
    }

    /// Identifies the vendor lifetime this build belongs to. Unique across
    /// the registry; a disable, unload or re-registration starts a new one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancelled when the vendor's instances are torn down. Background tasks
    /// and transport connections must be bound to it.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// The adapter every capability of a vendor shares within one lifetime.
///
/// A factory registered under several keys builds through the cell: the
/// first build of a lifetime runs `init`, concurrent and later builds of the
/// same lifetime wait for it and reuse the result, and a new lifetime builds
/// afresh.
pub struct AdapterCell<T> {
    slot: Mutex<Option<(u64, Arc<T>)>>,
}

impl<T> AdapterCell<T> {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    pub async fn get_or_try_init<F, Fut>(&self, ctx: &FactoryContext, init: F) -> Result<Arc<T>, DroneGateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<T>, DroneGateError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some((generation, adapter)) = slot.as_ref() {
            if *generation == ctx.generation() && !ctx.cancellation().is_cancelled() {
                return Ok(Arc::clone(adapter));
            }
        }
        // Drop the adapter of an ended lifetime before building its successor.
        slot.take();
        let adapter = init().await?;
        *slot = Some((ctx.generation(), Arc::clone(&adapter)));
        Ok(adapter)
    }
}

impl<T> Default for AdapterCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds capability instances for one (vendor, capability) pair.
///
/// The registry caches each built instance until the vendor's lifetime ends.
/// Factories whose capabilities share one connection build through an
/// [`AdapterCell`] so the vendor holds a single adapter.
#[async_trait]
pub trait CapabilityFactory: Send + Sync + 'static {
    async fn build(&self, ctx: FactoryContext) -> Result<CapabilityInstance, DroneGateError>;
}

#[async_trait]
impl<F, Fut> CapabilityFactory for F
where
    F: Fn(FactoryContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CapabilityInstance, DroneGateError>> + Send + 'static,
{
    async fn build(&self, ctx: FactoryContext) -> Result<CapabilityInstance, DroneGateError> {
        (self)(ctx).await
    }
}

/// A capability trait object, tagged by its key.
#[derive(Clone)]
pub enum CapabilityHandle {
    FlightControl(Arc<dyn FlightControl>),
    Telemetry(Arc<dyn TelemetryReader>),
    LiveStream(Arc<dyn LiveStream>),
    Projects(Arc<dyn ProjectApi>),
    FlightTasks(Arc<dyn FlightTaskApi>),
    Waylines(Arc<dyn WaylineApi>),
}

impl CapabilityHandle {
    pub fn key(&self) -> CapabilityKey {
        match self {
            Self::FlightControl(_) => CapabilityKey::FlightControl,
            Self::Telemetry(_) => CapabilityKey::Telemetry,
            Self::LiveStream(_) => CapabilityKey::LiveStream,
            Self::Projects(_) => CapabilityKey::Projects,
            Self::FlightTasks(_) => CapabilityKey::FlightTasks,
            Self::Waylines(_) => CapabilityKey::Waylines,
        }
    }
}

impl std::fmt::Debug for CapabilityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CapabilityHandle").field(&self.key()).finish()
    }
}

/// A built capability plus the adapter behind it, for health checks and shutdown.
#[derive(Clone)]
pub struct CapabilityInstance {
    handle: CapabilityHandle,
    adapter: Arc<dyn DroneAdapter>,
}

impl CapabilityInstance {
    pub fn flight_control<T: FlightControl>(adapter: Arc<T>) -> Self {
        Self {
            handle: CapabilityHandle::FlightControl(adapter.clone()),
            adapter,
        }
    }

    pub fn telemetry<T: TelemetryReader>(adapter: Arc<T>) -> Self {
        Self {
            handle: CapabilityHandle::Telemetry(adapter.clone()),
            adapter,
        }
    }

    pub fn live_stream<T: LiveStream>(adapter: Arc<T>) -> Self {
        Self {
            handle: CapabilityHandle::LiveStream(adapter.clone()),
            adapter,
        }
    }

    pub fn projects<T: ProjectApi>(adapter: Arc<T>) -> Self {
        Self {
            handle: CapabilityHandle::Projects(adapter.clone()),
            adapter,
        }
    }

    pub fn flight_tasks<T: FlightTaskApi>(adapter: Arc<T>) -> Self {
        Self {
            handle: CapabilityHandle::FlightTasks(adapter.clone()),
            adapter,
        }
    }

    pub fn waylines<T: WaylineApi>(adapter: Arc<T>) -> Self {
        Self {
            handle: CapabilityHandle::Waylines(adapter.clone()),
            adapter,
        }
    }

    pub fn key(&self) -> CapabilityKey {
        self.handle.key()
    }

    pub fn handle(&self) -> &CapabilityHandle {
        &self.handle
    }

    pub fn adapter(&self) -> &Arc<dyn DroneAdapter> {
        &self.adapter
    }

    /// The capability as its trait object, if `T` matches this instance's key.
    pub fn get<T: Capability + ?Sized>(&self) -> Option<Arc<T>> {
        T::from_handle(&self.handle)
    }
}

impl std::fmt::Debug for CapabilityInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityInstance")
            .field("key", &self.key())
            .field("adapter", &self.adapter.name())
            .finish()
    }
}

/// Links a `dyn` capability trait to its key.
pub trait Capability: Send + Sync + 'static {
    const KEY: CapabilityKey;

    fn from_handle(handle: &CapabilityHandle) -> Option<Arc<Self>>;
}

macro_rules! capability {
    ($trait:ident, $variant:ident) => {
        impl Capability for dyn $trait {
            const KEY: CapabilityKey = CapabilityKey::$variant;

            fn from_handle(handle: &CapabilityHandle) -> Option<Arc<Self>> {
                match handle {
                    CapabilityHandle::$variant(inner) => Some(Arc::clone(inner)),
                    _ => None,
                }
            }
        }
    };
}

capability!(FlightControl, FlightControl);
capability!(TelemetryReader, Telemetry);
capability!(LiveStream, LiveStream);
capability!(ProjectApi, Projects);
capability!(FlightTaskApi, FlightTasks);
capability!(WaylineApi, Waylines);

#[cfg(test)]
mod tests {
    use dronegate_core::{HealthStatus, TelemetrySnapshot};

    use super::*;

    #[derive(Debug)]
    struct Sensor {
        vendor: VendorType,
    }

    #[async_trait]
    impl DroneAdapter for Sensor {
        fn name(&self) -> &str {
            "sensor"
        }

        fn vendor(&self) -> &VendorType {
            &self.vendor
        }

        async fn health_check(&self) -> Result<HealthStatus, DroneGateError> {
            Ok(HealthStatus::Healthy)
        }

        async fn shutdown(&self) -> Result<(), DroneGateError> {
            Ok(())
        }
    }

    impl TelemetryReader for Sensor {
        fn latest_telemetry(&self) -> Option<TelemetrySnapshot> {
            None
        }
    }

    #[test]
    fn instance_downcasts_only_to_its_own_capability() {
        let instance = CapabilityInstance::telemetry(Arc::new(Sensor {
            vendor: VendorType::from("sensor"),
        }));
        assert_eq!(instance.key(), CapabilityKey::Telemetry);
        assert!(instance.get::<dyn TelemetryReader>().is_some());
        assert!(instance.get::<dyn FlightControl>().is_none());
        assert_eq!(instance.adapter().name(), "sensor");
    }

    #[test]
    fn capability_keys_match_handles() {
        assert_eq!(<dyn FlightControl as Capability>::KEY, CapabilityKey::FlightControl);
        assert_eq!(<dyn WaylineApi as Capability>::KEY, CapabilityKey::Waylines);
        assert_eq!(<dyn ProjectApi as Capability>::KEY, CapabilityKey::Projects);
    }

    #[tokio::test]
    async fn closures_are_factories() {
        let factory = |ctx: FactoryContext| async move {
            assert_eq!(ctx.key(), CapabilityKey::Telemetry);
            Ok::<_, DroneGateError>(CapabilityInstance::telemetry(Arc::new(Sensor {
                vendor: ctx.vendor().clone(),
            })))
        };
        let ctx = FactoryContext::new(
            VendorType::from("sensor"),
            CapabilityKey::Telemetry,
            1,
            CancellationToken::new(),
        );
        let instance = factory.build(ctx).await.unwrap();
        assert_eq!(instance.adapter().vendor().as_str(), "sensor");
    }

    fn ctx(generation: u64, cancel: &CancellationToken) -> FactoryContext {
        FactoryContext::new(VendorType::from("sensor"), CapabilityKey::Telemetry, generation, cancel.clone())
    }

    fn sensor() -> Arc<Sensor> {
        Arc::new(Sensor {
            vendor: VendorType::from("sensor"),
        })
    }

    #[tokio::test]
    async fn adapter_cell_reuses_within_a_lifetime() {
        let cell = AdapterCell::new();
        let lifetime = CancellationToken::new();

        let first = cell
            .get_or_try_init(&ctx(1, &lifetime), || async { Ok(sensor()) })
            .await
            .unwrap();
        let second = cell
            .get_or_try_init(&ctx(1, &lifetime), || async {
                Err(DroneGateError::Internal("must not rebuild".into()))
            })
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn adapter_cell_rebuilds_for_a_new_lifetime() {
        let cell = AdapterCell::new();
        let old = CancellationToken::new();
        let first = cell
            .get_or_try_init(&ctx(1, &old), || async { Ok(sensor()) })
            .await
            .unwrap();

        old.cancel();
        let fresh = CancellationToken::new();
        let second = cell
            .get_or_try_init(&ctx(2, &fresh), || async { Ok(sensor()) })
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn adapter_cell_failure_is_not_cached() {
        let cell: AdapterCell<Sensor> = AdapterCell::new();
        let lifetime = CancellationToken::new();
        let err = cell
            .get_or_try_init(&ctx(1, &lifetime), || async {
                Err(DroneGateError::Transport {
                    message: "broker unreachable".into(),
                    source: None,
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DroneGateError::Transport { .. }));
        assert!(
            cell.get_or_try_init(&ctx(1, &lifetime), || async { Ok(sensor()) })
                .await
                .is_ok()
        );
    }
}
