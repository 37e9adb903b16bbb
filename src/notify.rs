use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::http::build_http_client;
use crate::traits::EventSink;
use crate::types::NotificationEvent;

/// Posts notification events to the caller-supplied channel URL.
///
/// Delivery is best-effort: one attempt, no retries, nothing awaited beyond
/// the HTTP response. Callers log failures and move on.
pub struct HttpEventSink {
    client: Client,
}

impl HttpEventSink {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(timeout, None)?,
        })
    }
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn notify(&self, channel_url: &str, event: &NotificationEvent) -> anyhow::Result<()> {
        let resp = self.client.post(channel_url).json(event).send().await?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("channel returned {}", status);
        }
        debug!(event = %event.event_name, "Notification delivered");
        Ok(())
    }
}
