//! MQTT channel for Cloud IoT Core telemetry.
//!
//! Provides the publish path for a single device:
//! - `sign_token` for the RS256 JWT used as the MQTT password
//! - `load_tls_transport` for the broker's TLS session
//! - `Channel` trait for publishing (mockable in tests)
//! - `IotCoreClient` running one connect → burst → disconnect cycle
//! - `MockChannel` for testing without a broker

pub mod burst;
pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod mock;
pub mod tls;
pub mod token;

// Re-exports for convenience.
pub use burst::{PublishReport, TELEMETRY_QOS, publish_burst};
pub use channel::{Channel, MqttChannel};
pub use client::IotCoreClient;
pub use config::{BurstConfig, DISCONNECT_GRACE, MqttConfig};
pub use error::{MqttError, MqttResult, TokenError};
pub use handler::{IncomingMessage, classify};
pub use mock::MockChannel;
pub use token::{Claims, TOKEN_TTL, sign_token, sign_with_key};
