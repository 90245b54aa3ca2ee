// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Latest-value cache for device telemetry.
//!
//! A snapshot is replaced wholesale under the write lock, and only after the
//! payload decoded successfully: a malformed message never clobbers good data.
//! Delivery order is whatever the transport provides per topic; out-of-order
//! messages are not detected.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dronegate_core::{DroneGateError, Subscription, TelemetrySnapshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct TelemetryCache {
    latest: RwLock<Option<TelemetrySnapshot>>,
    updates: AtomicU64,
}

impl TelemetryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `payload` and make it the latest snapshot.
    pub fn on_message(&self, payload: &[u8]) -> Result<(), DroneGateError> {
        let snapshot: TelemetrySnapshot = serde_json::from_slice(payload)
            .map_err(|e| DroneGateError::decode("malformed telemetry payload", e))?;

        match self.latest.write() {
            Ok(mut latest) => *latest = Some(snapshot),
            Err(poisoned) => *poisoned.into_inner() = Some(snapshot),
        }
        self.updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// The most recent snapshot, or `None` before the first valid message.
    pub fn latest(&self) -> Option<TelemetrySnapshot> {
        match self.latest.read() {
            Ok(latest) => latest.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of snapshots accepted so far.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}

/// Feed every payload of `subscription` into `cache` until the subscription
/// ends or `cancel` fires. Undecodable payloads are logged and dropped.
pub fn spawn_telemetry_pump(
    mut subscription: Subscription,
    cache: Arc<TelemetryCache>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = subscription.next() => {
                    let Some(payload) = message else {
                        debug!(topic = subscription.topic(), "telemetry subscription closed");
                        break;
                    };
                    if let Err(e) = cache.on_message(&payload) {
                        warn!(topic = subscription.topic(), error = %e, "dropping telemetry message");
                    }
                }
            }
        }
        debug!(topic = subscription.topic(), "telemetry pump stopped");
    })
}
