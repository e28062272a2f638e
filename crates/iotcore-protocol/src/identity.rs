use crate::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_USERNAME, topics};

/// A device registered in Cloud IoT Core, plus the addressing strings
/// derived from it.
///
/// Fields are fixed at construction. Inputs are not validated: malformed
/// ids produce well-formed but wrong topics, which the broker rejects at
/// connect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    host: String,
    port: u16,
    project_id: String,
    region: String,
    registry_id: String,
    device_id: String,
    private_key_path: String,
    config_topic: String,
    telemetry_topic: String,
    client_id: String,
}

impl DeviceIdentity {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        registry_id: impl Into<String>,
        device_id: impl Into<String>,
        private_key_path: impl Into<String>,
    ) -> Self {
        let project_id = project_id.into();
        let region = region.into();
        let registry_id = registry_id.into();
        let device_id = device_id.into();

        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            config_topic: topics::config(&device_id),
            telemetry_topic: topics::telemetry(&device_id),
            client_id: topics::client_id(&project_id, &region, &registry_id, &device_id),
            project_id,
            region,
            registry_id,
            device_id,
            private_key_path: private_key_path.into(),
        }
    }

    /// Point the identity at a different bridge endpoint.
    pub fn with_broker(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn registry_id(&self) -> &str {
        &self.registry_id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn private_key_path(&self) -> &str {
        &self.private_key_path
    }

    pub fn username(&self) -> &str {
        DEFAULT_USERNAME
    }

    pub fn config_topic(&self) -> &str {
        &self.config_topic
    }

    pub fn telemetry_topic(&self) -> &str {
        &self.telemetry_topic
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}
