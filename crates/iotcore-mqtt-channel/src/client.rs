//! One connect → publish burst → disconnect cycle against the bridge.
//!
//! Every call to [`IotCoreClient::publish`] signs a fresh JWT and opens a
//! new session; nothing is reused between calls.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet};
use tokio::task::JoinHandle;

use iotcore_protocol::{DeviceIdentity, topics};

use crate::burst::{PublishReport, publish_burst};
use crate::channel::MqttChannel;
use crate::config::{BurstConfig, MqttConfig};
use crate::error::{MqttError, MqttResult};
use crate::handler;
use crate::tls;
use crate::token;

/// Request queue depth between `AsyncClient` and the event loop.
const REQUEST_CAPACITY: usize = 16;

/// Publishes telemetry for one device.
pub struct IotCoreClient {
    identity: DeviceIdentity,
    config: MqttConfig,
    burst: BurstConfig,
}

impl IotCoreClient {
    pub fn new(identity: DeviceIdentity, config: MqttConfig) -> Self {
        Self {
            identity,
            config,
            burst: BurstConfig::default(),
        }
    }

    pub fn with_burst(mut self, burst: BurstConfig) -> Self {
        self.burst = burst;
        self
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Send `Message:{message}` to the telemetry topic as one burst.
    ///
    /// Fails only if signing, TLS setup, or connecting fails; in that case
    /// nothing is published. Send failures during the burst are logged and
    /// counted in the report; a slow shutdown is only logged.
    pub async fn publish(&self, message: &str) -> MqttResult<PublishReport> {
        let password = token::sign_token(
            self.identity.project_id(),
            self.identity.private_key_path(),
            self.config.token_ttl(),
        )?;

        let options = self.mqtt_options(password)?;
        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        tracing::info!(
            client_id = %self.identity.client_id(),
            host = %self.identity.host(),
            port = self.identity.port(),
            "connecting"
        );
        wait_for_connack(&mut eventloop, self.config.connect_timeout()).await?;
        tracing::info!(client_id = %self.identity.client_id(), "connected");

        let mut driver = tokio::spawn(drive(eventloop));
        let channel = MqttChannel::new(client);

        let payload = topics::telemetry_payload(message);
        let report = publish_burst(
            &channel,
            self.identity.telemetry_topic(),
            payload.as_bytes(),
            &self.burst,
        )
        .await;

        if let Err(e) = channel.disconnect().await {
            tracing::warn!(error = %e, "failed to queue disconnect");
        }
        shutdown(&mut driver, self.config.disconnect_timeout()).await;

        tracing::info!(
            topic = %self.identity.telemetry_topic(),
            attempted = report.attempted,
            failed = report.failed,
            "publish cycle finished"
        );
        Ok(report)
    }

    fn mqtt_options(&self, password: String) -> MqttResult<MqttOptions> {
        let mut options = MqttOptions::new(
            self.identity.client_id(),
            self.identity.host(),
            self.identity.port(),
        );
        options.set_keep_alive(Duration::from_secs(self.config.keepalive_secs.into()));
        options.set_credentials(self.identity.username(), password);

        let transport = if self.config.use_tls {
            tls::load_tls_transport(&self.config)?
        } else {
            tracing::info!("MQTT plaintext mode (no TLS)");
            tls::plaintext_transport()
        };
        options.set_transport(transport);

        Ok(options)
    }
}

/// Poll until the broker answers CONNECT.
async fn wait_for_connack(eventloop: &mut EventLoop, timeout: Duration) -> MqttResult<()> {
    let handshake = async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    return match ack.code {
                        ConnectReturnCode::Success => Ok(()),
                        code => Err(MqttError::Connection(format!(
                            "broker refused connection: {code:?}"
                        ))),
                    };
                }
                Ok(_) => {}
                Err(e) => return Err(MqttError::Connection(e.to_string())),
            }
        }
    };

    tokio::time::timeout(timeout, handshake)
        .await
        .map_err(|_| {
            MqttError::Connection(format!("no CONNACK within {}ms", timeout.as_millis()))
        })?
}

/// Drive the event loop until the DISCONNECT is flushed or the
/// connection drops.
async fn drive(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => handler::log_incoming(&publish),
            Ok(Event::Incoming(Packet::PubAck(ack))) => {
                tracing::debug!(pkid = ack.pkid, "publish acknowledged");
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::debug!("disconnect sent");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "event loop closed");
                return;
            }
        }
    }
}

async fn shutdown(driver: &mut JoinHandle<()>, grace: Duration) {
    match tokio::time::timeout(grace, &mut *driver).await {
        Ok(Ok(())) => tracing::debug!("session closed"),
        Ok(Err(e)) => tracing::warn!(error = %e, "event loop task failed"),
        Err(_) => {
            tracing::warn!(
                grace_ms = grace.as_millis() as u64,
                "disconnect grace period elapsed"
            );
            driver.abort();
        }
    }
}
