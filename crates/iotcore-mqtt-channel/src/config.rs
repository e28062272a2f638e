use std::time::Duration;

use serde::Deserialize;

use crate::token::TOKEN_TTL;

/// Time the event loop gets to flush DISCONNECT and close the socket.
pub const DISCONNECT_GRACE: Duration = Duration::from_millis(2000);

/// Connection settings for one publish cycle, loadable from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    /// MQTT bridge hostname.
    #[serde(default = "default_host")]
    pub broker_host: String,
    /// MQTT bridge port (8883 for TLS).
    #[serde(default = "default_port")]
    pub broker_port: u16,
    /// Enable TLS. When false, connects plaintext (local dev).
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    /// CA bundle (PEM). Falls back to `$CA_CERT_PATH` when unset.
    #[serde(default)]
    pub ca_cert_path: Option<String>,
    /// Skip server certificate verification. Never enable in production.
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u16,
    /// Lifetime of the JWT signed for each connection.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_mins: u64,
    /// Upper bound on TCP/TLS handshake plus CONNACK.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Grace period for the event loop to flush and close after DISCONNECT.
    #[serde(default = "default_disconnect_timeout")]
    pub disconnect_timeout_ms: u64,
}

fn default_host() -> String {
    iotcore_protocol::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    iotcore_protocol::DEFAULT_PORT
}

fn default_use_tls() -> bool {
    true
}

fn default_keepalive() -> u16 {
    60
}

fn default_token_ttl() -> u64 {
    TOKEN_TTL.as_secs() / 60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_disconnect_timeout() -> u64 {
    DISCONNECT_GRACE.as_millis() as u64
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: default_host(),
            broker_port: default_port(),
            use_tls: default_use_tls(),
            ca_cert_path: None,
            insecure_skip_verify: false,
            keepalive_secs: default_keepalive(),
            token_ttl_mins: default_token_ttl(),
            connect_timeout_secs: default_connect_timeout(),
            disconnect_timeout_ms: default_disconnect_timeout(),
        }
    }
}

impl MqttConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_mins.saturating_mul(60))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.disconnect_timeout_ms)
    }
}

/// How many times a message is sent per cycle, and the pause between sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BurstConfig {
    #[serde(default = "default_burst_count")]
    pub count: u32,
    #[serde(default = "default_burst_interval")]
    pub interval_ms: u64,
}

fn default_burst_count() -> u32 {
    5
}

fn default_burst_interval() -> u64 {
    50
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            count: default_burst_count(),
            interval_ms: default_burst_interval(),
        }
    }
}

impl BurstConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
