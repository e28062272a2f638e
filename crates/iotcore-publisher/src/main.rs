//! Cloud IoT Core publisher — signs a device JWT, connects over TLS, and
//! sends one telemetry burst.
//!
//! Usage: `iotcore-publisher [CONFIG_PATH] [MESSAGE]`

use tracing_subscriber::EnvFilter;

use iotcore_mqtt_channel::IotCoreClient;
use iotcore_publisher::config::PublisherConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "iotcore-publisher starting"
    );

    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .unwrap_or_else(|| "/etc/iotcore/publisher.toml".to_string());
    let message = args.next().unwrap_or_else(|| "hello".to_string());

    let config = PublisherConfig::from_file(&config_path)?;
    let identity = config.identity();
    tracing::info!(
        client_id = %identity.client_id(),
        topic = %identity.telemetry_topic(),
        "config loaded"
    );

    let client = IotCoreClient::new(identity, config.mqtt).with_burst(config.burst);
    let report = client.publish(&message).await?;

    if !report.is_complete() {
        tracing::warn!(
            attempted = report.attempted,
            failed = report.failed,
            "some telemetry sends failed"
        );
    }

    tracing::info!("iotcore-publisher stopped");
    Ok(())
}
