pub mod identity;
pub mod topics;

pub use identity::*;

/// Public Cloud IoT Core MQTT bridge.
pub const DEFAULT_HOST: &str = "mqtt.googleapis.com";

/// TLS port of the MQTT bridge.
pub const DEFAULT_PORT: u16 = 8883;

/// The bridge ignores the username; the JWT in the password field carries
/// the credential.
pub const DEFAULT_USERNAME: &str = "unused";
