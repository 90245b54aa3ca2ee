// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background refresh loop for one live adapter instance.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::credential::CredentialManager;

/// Calls [`CredentialManager::ensure_fresh`] on a fixed interval until cancelled.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Spawn the loop. The first check runs one `period` after start; a
    /// failed refresh is logged and retried on the next tick.
    pub fn spawn(
        manager: Arc<CredentialManager>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            debug!(vendor = %manager.vendor(), period_secs = period.as_secs(), "refresh scheduler started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(vendor = %manager.vendor(), "refresh scheduler shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = manager.ensure_fresh().await {
                            warn!(
                                vendor = %manager.vendor(),
                                error = %e,
                                "scheduled token refresh failed, retrying next interval"
                            );
                        }
                    }
                }
            }
        })
    }
}
