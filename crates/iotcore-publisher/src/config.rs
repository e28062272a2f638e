//! Publisher configuration, loadable from TOML.

use iotcore_mqtt_channel::{BurstConfig, MqttConfig};
use iotcore_protocol::DeviceIdentity;
use serde::Deserialize;

/// Top-level configuration for the publisher.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    /// GCP project owning the registry. Also the JWT audience.
    pub project_id: String,
    /// Cloud region of the registry (e.g., "us-central1").
    pub region: String,
    /// Device registry id.
    pub registry_id: String,
    /// Device id within the registry.
    pub device_id: String,
    /// PEM RSA private key whose public half is registered on the device.
    pub private_key_path: String,
    /// MQTT connection settings.
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// Messages per publish cycle.
    #[serde(default)]
    pub burst: BurstConfig,
}

impl PublisherConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(
            &self.project_id,
            &self.region,
            &self.registry_id,
            &self.device_id,
            &self.private_key_path,
        )
        .with_broker(&self.mqtt.broker_host, self.mqtt.broker_port)
    }
}
