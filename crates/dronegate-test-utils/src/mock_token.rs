// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock vendor token endpoint.
//!
//! Each successful fetch issues `"{prefix}-{n}"` where `n` counts fetches from 1.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dronegate_auth::{IssuedToken, TokenSource};
use dronegate_core::DroneGateError;

pub struct MockTokenSource {
    prefix: String,
    fetches: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    expires_in: Mutex<Option<Duration>>,
}

impl MockTokenSource {
    pub fn new() -> Self {
        Self::with_prefix("token")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            fetches: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
            expires_in: Mutex::new(None),
        }
    }

    /// Number of fetch attempts so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Simulated endpoint latency.
    pub fn set_delay(&self, delay: Duration) {
        if let Ok(mut slot) = self.delay.lock() {
            *slot = Some(delay);
        }
    }

    /// Lifetime declared by issued tokens; `None` leaves it to the policy.
    pub fn set_expires_in(&self, expires_in: Option<Duration>) {
        if let Ok(mut slot) = self.expires_in.lock() {
            *slot = expires_in;
        }
    }
}

impl Default for MockTokenSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSource for MockTokenSource {
    async fn fetch(&self) -> Result<IssuedToken, DroneGateError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = self.delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(DroneGateError::Auth {
                message: format!("mock token endpoint unavailable (attempt {n})"),
                source: None,
            });
        }

        let mut issued = IssuedToken::new(format!("{}-{n}", self.prefix));
        issued.expires_in = self.expires_in.lock().ok().and_then(|e| *e);
        Ok(issued)
    }
}
