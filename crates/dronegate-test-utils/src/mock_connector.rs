// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dronegate_core::{ConnectOptions, DroneGateError, PubSubTransport, TransportConnector};

/// A broker that is never reachable.
#[derive(Debug, Default)]
pub struct FailingConnector {
    attempts: AtomicUsize,
}

impl FailingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportConnector for FailingConnector {
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<Arc<dyn PubSubTransport>, DroneGateError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DroneGateError::Transport {
            message: format!("broker {} refused connection", options.broker_url),
            source: None,
        })
    }
}
