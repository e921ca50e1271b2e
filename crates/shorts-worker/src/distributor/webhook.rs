//! Generic JSON webhook channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{LinkPayload, LinkPayloadChannel};
use crate::config::WebhookConfig;
use crate::error::{WorkerError, WorkerResult};

#[derive(Debug, Clone)]
pub struct WebhookChannel {
    http: Client,
    config: WebhookConfig,
}

impl WebhookChannel {
    pub fn new(config: WebhookConfig, timeout: Duration) -> WorkerResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl LinkPayloadChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send_link(&self, payload: &LinkPayload) -> WorkerResult<()> {
        debug!(video_url = %payload.video_url, "Posting webhook");

        let response = self.http.post(&self.config.url).json(payload).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::delivery_failed(format!(
                "webhook returned {}: {}",
                status,
                body.trim()
            )));
        }
        Ok(())
    }
}
