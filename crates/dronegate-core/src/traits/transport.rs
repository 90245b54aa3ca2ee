// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publish/subscribe transport consumed by gateway adapters.
//!
//! The network client (an MQTT broker connection in production) is supplied
//! by the embedding application through [`TransportConnector`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::DroneGateError;

/// Parameters for opening a broker connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Broker address, e.g. `tcp://broker.local:1883`.
    pub broker_url: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub clean_session: bool,
    pub auto_reconnect: bool,
}

/// Stream of raw payloads delivered on one topic.
///
/// Ends (`next` returns `None`) when the transport disconnects.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    receiver: mpsc::Receiver<Vec<u8>>,
}

impl Subscription {
    pub fn new(topic: impl Into<String>, receiver: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            receiver,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn next(&mut self) -> Option<Vec<u8>> {
        self.receiver.recv().await
    }
}

/// An open publish/subscribe connection.
#[async_trait]
pub trait PubSubTransport: Send + Sync + 'static {
    /// Publishes `payload` on `topic` and waits for the broker to accept it.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), DroneGateError>;

    /// Subscribes to `topic`; inbound payloads arrive on the returned subscription.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, DroneGateError>;

    /// Closes the connection. Subsequent publishes fail.
    async fn disconnect(&self) -> Result<(), DroneGateError>;
}

/// Opens transport connections for adapter factories.
#[async_trait]
pub trait TransportConnector: Send + Sync + 'static {
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<Arc<dyn PubSubTransport>, DroneGateError>;
}
