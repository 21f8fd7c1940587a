use async_trait::async_trait;
use reqwest::Client;

use crate::types::*;

/// Public ntfy server.
pub const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";
/// Topic used when none is configured.
pub const DEFAULT_NTFY_TOPIC: &str = "campsite";

/// Notification service that publishes plain-text alerts to an ntfy topic.
#[derive(Debug, Clone)]
pub struct NtfyNotifier {
    client: Client,
    base_url: String,
    topic: String,
}

impl NtfyNotifier {
    /// Creates a notifier publishing to `{base_url}/{topic}`.
    pub fn new(
        base_url: impl Into<String>,
        topic: impl Into<String>,
    ) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .build()
            .map_err(|e| NotificationError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            topic: topic.into(),
        })
    }

    /// URL alerts are posted to.
    pub fn topic_url(&self) -> String {
        format!("{}/{}", self.base_url, self.topic)
    }

    /// Publishes a plain-text message to the topic.
    pub async fn publish(&self, message: &str) -> Result<(), NotificationError> {
        let url = self.topic_url();
        log::debug!("Publishing to {}: {}", url, message);

        let response = self
            .client
            .post(&url)
            .body(message.to_string())
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ ntfy request to {} failed: {}", url, e);
                NotificationError::Http(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("❌ ntfy rejected notification: {}", status);
            return Err(NotificationError::Rejected(status.as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for NtfyNotifier {
    async fn notify(&self, alert: &AvailabilityAlert) -> Result<(), NotificationError> {
        let message = alert.message();
        self.publish(&message).await?;
        log::info!("📣 {}", message);
        Ok(())
    }
}
