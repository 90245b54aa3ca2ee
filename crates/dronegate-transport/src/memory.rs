// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process pub/sub broker.
//!
//! Implements the transport traits without a network: useful for running the
//! gateway locally and for exercising adapters in tests. Topic matching is
//! exact; wildcards are not supported.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use dronegate_core::{ConnectOptions, DroneGateError, PubSubTransport, Subscription, TransportConnector};
use tokio::sync::mpsc;
use tracing::{debug, info};

const SUBSCRIPTION_BUFFER: usize = 64;

#[derive(Debug, Default)]
struct BrokerState {
    subscribers: HashMap<String, Vec<mpsc::Sender<Vec<u8>>>>,
    published: Vec<(String, Vec<u8>)>,
}

/// Shared broker; clones refer to the same message space.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    active: Arc<AtomicUsize>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Deliver `payload` to every subscriber of `topic`, as a device would.
    ///
    /// Returns the number of subscribers reached.
    pub async fn inject(&self, topic: &str, payload: impl Into<Vec<u8>>) -> usize {
        let payload = payload.into();
        let senders: Vec<_> = {
            let mut state = self.lock();
            let Some(senders) = state.subscribers.get_mut(topic) else {
                return 0;
            };
            senders.retain(|s| !s.is_closed());
            senders.clone()
        };

        let mut delivered = 0;
        for sender in senders {
            if sender.send(payload.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Every message published through any connection, in order.
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.lock().published.clone()
    }

    /// Number of connections that have not been disconnected.
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of open subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock()
            .subscribers
            .get(topic)
            .map(|s| s.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl TransportConnector for MemoryBroker {
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<Arc<dyn PubSubTransport>, DroneGateError> {
        if options.client_id.is_empty() {
            return Err(DroneGateError::Transport {
                message: "client id must not be empty".to_string(),
                source: None,
            });
        }
        self.active.fetch_add(1, Ordering::SeqCst);
        info!(client_id = %options.client_id, broker = %options.broker_url, "in-process broker connection opened");
        Ok(Arc::new(MemoryConnection {
            broker: self.clone(),
            client_id: options.client_id.clone(),
            connected: AtomicBool::new(true),
            subscriptions: Mutex::new(Vec::new()),
        }))
    }
}

/// One client connection to a [`MemoryBroker`].
#[derive(Debug)]
pub struct MemoryConnection {
    broker: MemoryBroker,
    client_id: String,
    connected: AtomicBool,
    /// Topics this connection subscribed to, so disconnect can close them.
    subscriptions: Mutex<Vec<(String, mpsc::Sender<Vec<u8>>)>>,
}

impl MemoryConnection {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn ensure_connected(&self) -> Result<(), DroneGateError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DroneGateError::Transport {
                message: format!("connection `{}` is closed", self.client_id),
                source: None,
            })
        }
    }
}

#[async_trait]
impl PubSubTransport for MemoryConnection {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), DroneGateError> {
        self.ensure_connected()?;
        debug!(client_id = %self.client_id, topic, bytes = payload.len(), "publish");
        self.broker
            .lock()
            .published
            .push((topic.to_string(), payload.clone()));
        self.broker.inject(topic, payload).await;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, DroneGateError> {
        self.ensure_connected()?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        self.broker
            .lock()
            .subscribers
            .entry(topic.to_string())
            .or_default()
            .push(tx.clone());
        if let Ok(mut subs) = self.subscriptions.lock() {
            subs.push((topic.to_string(), tx));
        }
        debug!(client_id = %self.client_id, topic, "subscribed");
        Ok(Subscription::new(topic, rx))
    }

    async fn disconnect(&self) -> Result<(), DroneGateError> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let ours: Vec<_> = match self.subscriptions.lock() {
            Ok(mut subs) => subs.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        // Dropping every sender for a subscription ends its stream.
        let mut state = self.broker.lock();
        for (topic, tx) in ours {
            if let Some(senders) = state.subscribers.get_mut(&topic) {
                senders.retain(|s| !s.same_channel(&tx));
            }
        }
        drop(state);

        self.broker.active.fetch_sub(1, Ordering::SeqCst);
        info!(client_id = %self.client_id, "in-process broker connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(client_id: &str) -> ConnectOptions {
        ConnectOptions {
            broker_url: "tcp://memory:1883".into(),
            client_id: client_id.into(),
            username: String::new(),
            password: String::new(),
            clean_session: true,
            auto_reconnect: true,
        }
    }

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let broker = MemoryBroker::new();
        let conn = broker.connect(&options("c1")).await.unwrap();
        let mut sub = conn.subscribe("thing/product/SN/services/osd").await.unwrap();

        conn.publish("thing/product/SN/services/osd", b"hello".to_vec())
            .await
            .unwrap();

        assert_eq!(sub.next().await.unwrap(), b"hello");
        assert_eq!(broker.published().len(), 1);
    }

    #[tokio::test]
    async fn inject_without_subscribers_is_dropped() {
        let broker = MemoryBroker::new();
        assert_eq!(broker.inject("nobody/listens", b"x".to_vec()).await, 0);
    }

    #[tokio::test]
    async fn disconnect_closes_subscriptions_and_rejects_publish() {
        let broker = MemoryBroker::new();
        let conn = broker.connect(&options("c1")).await.unwrap();
        let mut sub = conn.subscribe("t").await.unwrap();
        assert_eq!(broker.active_connections(), 1);
        assert_eq!(broker.subscriber_count("t"), 1);

        conn.disconnect().await.unwrap();
        conn.disconnect().await.unwrap();

        assert!(sub.next().await.is_none());
        assert_eq!(broker.active_connections(), 0);
        assert_eq!(broker.subscriber_count("t"), 0);
        assert!(matches!(
            conn.publish("t", vec![]).await,
            Err(DroneGateError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn empty_client_id_is_rejected() {
        let broker = MemoryBroker::new();
        assert!(broker.connect(&options("")).await.is_err());
    }
}
