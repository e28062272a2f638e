//! Mock MQTT channel for testing without a real broker.
//!
//! Records all published messages for assertion in tests, and can be
//! told to fail chosen publish calls.

use async_trait::async_trait;
use rumqttc::QoS;
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::time::Instant;

use crate::channel::Channel;
use crate::error::{MqttError, MqttResult};

/// A recorded publish call.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub sent_at: Instant,
}

/// Mock implementation of the `Channel` trait.
///
/// Thread-safe via `Mutex` (fine for test contexts).
pub struct MockChannel {
    published: Mutex<Vec<PublishedMessage>>,
    /// Zero-based publish call indices that return an error.
    fail_on: HashSet<usize>,
    calls: Mutex<usize>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::failing_on([])
    }

    /// A mock whose publish calls at the given indices fail.
    pub fn failing_on(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail_on: indices.into_iter().collect(),
            calls: Mutex::new(0),
        }
    }

    /// Get all successfully published messages.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Get published messages for a specific topic.
    pub fn published_to(&self, topic: &str) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    /// Number of publish calls, failed ones included.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        if self.fail_on.contains(&call) {
            return Err(MqttError::Publish(format!("mock failure on call {call}")));
        }

        self.published.lock().unwrap().push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
            sent_at: Instant::now(),
        });
        Ok(())
    }
}
