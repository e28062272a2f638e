//! MQTT channel error types.

use thiserror::Error;

/// Errors from building the device JWT.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to read private key '{path}': {source}")]
    KeyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid RSA private key: {0}")]
    KeyParse(String),

    #[error("failed to sign token: {0}")]
    Sign(String),
}

/// Errors that can occur during a publish cycle.
#[derive(Debug, Error)]
pub enum MqttError {
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error("TLS error: {0}")]
    Tls(String),
}

/// Convenience alias for MQTT results.
pub type MqttResult<T> = Result<T, MqttError>;
