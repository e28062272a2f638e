//! MQTT channel — thin publish handle over `rumqttc::AsyncClient`.

use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};

use crate::error::{MqttError, MqttResult};

// ── Channel trait ─────────────────────────────────────────────

/// Abstraction for MQTT message publishing.
///
/// Enables mocking in tests without a real MQTT broker.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Publish a raw payload to a topic.
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()>;
}

// ── MqttChannel ───────────────────────────────────────────────

/// Publish handle for a connected session.
///
/// The session's `EventLoop` must be polled elsewhere for queued
/// publishes to reach the network.
pub struct MqttChannel {
    client: AsyncClient,
}

impl MqttChannel {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }

    /// Queue a DISCONNECT behind any pending publishes.
    pub async fn disconnect(&self) -> MqttResult<()> {
        self.client
            .disconnect()
            .await
            .map_err(|e| MqttError::Connection(e.to_string()))
    }
}

#[async_trait]
impl Channel for MqttChannel {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()> {
        self.client
            .publish(topic, qos, false, payload)
            .await
            .map_err(|e| MqttError::Publish(e.to_string()))
    }
}
