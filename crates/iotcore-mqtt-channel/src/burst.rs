//! Fixed-size telemetry burst over any `Channel`.

use rumqttc::QoS;

use crate::channel::Channel;
use crate::config::BurstConfig;

/// Telemetry is sent at-least-once.
pub const TELEMETRY_QOS: QoS = QoS::AtLeastOnce;

/// Outcome of a burst. Send failures are counted, not raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub attempted: u32,
    pub failed: u32,
}

impl PublishReport {
    pub fn succeeded(&self) -> u32 {
        self.attempted - self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Publish `payload` to `topic` `burst.count` times, pausing
/// `burst.interval()` between sends.
pub async fn publish_burst<C: Channel + ?Sized>(
    channel: &C,
    topic: &str,
    payload: &[u8],
    burst: &BurstConfig,
) -> PublishReport {
    let mut report = PublishReport::default();

    for seq in 0..burst.count {
        if seq > 0 {
            tokio::time::sleep(burst.interval()).await;
        }

        report.attempted += 1;
        match channel.publish(topic, payload, TELEMETRY_QOS).await {
            Ok(()) => tracing::debug!(topic = %topic, seq, "telemetry queued"),
            Err(e) => {
                report.failed += 1;
                tracing::warn!(topic = %topic, seq, error = %e, "telemetry publish failed");
            }
        }
    }

    report
}
