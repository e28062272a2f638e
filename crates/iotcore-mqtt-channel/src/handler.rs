//! Incoming message handling for the MQTT event loop.
//!
//! The publisher never subscribes, so anything arriving here was pushed
//! by the bridge on its own (e.g. a retained device config). It is
//! classified and logged, nothing more.

use rumqttc::Publish;

use iotcore_protocol::topics;

/// A classified incoming MQTT message.
#[derive(Debug, PartialEq, Eq)]
pub enum IncomingMessage {
    /// Device configuration pushed by the cloud.
    Config { device_id: String, payload: Vec<u8> },
    /// Unrecognized topic.
    Unknown { topic: String, payload: Vec<u8> },
}

/// Classify a raw MQTT publish.
pub fn classify(publish: &Publish) -> IncomingMessage {
    match topics::parse_topic(&publish.topic) {
        Some(parsed) if parsed.kind == "config" => IncomingMessage::Config {
            device_id: parsed.device_id,
            payload: publish.payload.to_vec(),
        },
        _ => IncomingMessage::Unknown {
            topic: publish.topic.clone(),
            payload: publish.payload.to_vec(),
        },
    }
}

/// Default handler: log the topic and payload.
pub fn log_incoming(publish: &Publish) {
    match classify(publish) {
        IncomingMessage::Config { device_id, payload } => {
            tracing::info!(
                device_id = %device_id,
                payload = %String::from_utf8_lossy(&payload),
                "received device config"
            );
        }
        IncomingMessage::Unknown { topic, payload } => {
            tracing::info!(
                topic = %topic,
                payload = %String::from_utf8_lossy(&payload),
                "received message"
            );
        }
    }
}
