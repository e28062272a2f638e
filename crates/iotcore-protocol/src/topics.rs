//! Topic and client-id builders for the Cloud IoT Core MQTT bridge.
//!
//! Topic structure:
//! ```text
//! /devices/{device_id}/config
//! /devices/{device_id}/events
//! ```
//!
//! Client identifier:
//! ```text
//! projects/{project_id}/locations/{region}/registries/{registry_id}/devices/{device_id}
//! ```

const PREFIX: &str = "/devices";

/// Full resource path the bridge expects as the MQTT client id.
pub fn client_id(project_id: &str, region: &str, registry_id: &str, device_id: &str) -> String {
    format!("projects/{project_id}/locations/{region}/registries/{registry_id}/devices/{device_id}")
}

/// Device configuration pushed by the cloud.
pub fn config(device_id: &str) -> String {
    format!("{PREFIX}/{device_id}/config")
}

/// Telemetry events published by the device.
pub fn telemetry(device_id: &str) -> String {
    format!("{PREFIX}/{device_id}/events")
}

/// Wrap a message in the telemetry payload template.
pub fn telemetry_payload(message: &str) -> String {
    format!("Message:{message}")
}

// ─── Topic parsing ───

/// Parsed device topic components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTopic {
    pub device_id: String,
    pub kind: String,
}

/// Parse `/devices/{device_id}/{kind}[/...]`.
/// Returns `None` if the topic doesn't match the expected format.
pub fn parse_topic(topic: &str) -> Option<ParsedTopic> {
    let rest = topic.strip_prefix(PREFIX)?.strip_prefix('/')?;
    let mut parts = rest.split('/');

    let device_id = parts.next().filter(|s| !s.is_empty())?;
    let kind = parts.next().filter(|s| !s.is_empty())?;

    Some(ParsedTopic {
        device_id: device_id.to_string(),
        kind: kind.to_string(),
    })
}
