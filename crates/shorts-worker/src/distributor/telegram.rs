//! Telegram Bot API `sendVideo` channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use shorts_models::Caption;

use super::DirectFileChannel;
use crate::config::TelegramConfig;
use crate::error::{WorkerError, WorkerResult};

/// Telegram rejects video captions longer than this many characters.
pub const TELEGRAM_CAPTION_LIMIT: usize = 1024;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Uploads the clip to a chat in a single multipart request.
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    http: Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig, timeout: Duration) -> WorkerResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendVideo",
            self.config.base_url.trim_end_matches('/'),
            self.config.token
        )
    }
}

fn truncate_caption(text: &str) -> String {
    text.chars().take(TELEGRAM_CAPTION_LIMIT).collect()
}

#[async_trait]
impl DirectFileChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_file(&self, file_name: &str, bytes: &[u8], caption: &Caption) -> WorkerResult<()> {
        debug!(chat_id = %self.config.chat_id, "Sending {} ({} bytes) to Telegram", file_name, bytes.len());

        let video = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("video/mp4")?;
        let form = Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .text("caption", truncate_caption(&caption.text()))
            .text("supports_streaming", "true")
            .part("video", video);

        let response = self.http.post(self.endpoint()).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // Telegram answers `{"ok": false, "description": ...}` on rejection
        let parsed = serde_json::from_str::<ApiResponse>(&body).ok();
        if status.is_success() && parsed.as_ref().map_or(true, |r| r.ok) {
            return Ok(());
        }

        let detail = parsed
            .and_then(|r| r.description)
            .unwrap_or_else(|| body.trim().to_string());
        Err(WorkerError::delivery_failed(format!(
            "Telegram returned {}: {}",
            status, detail
        )))
    }
}
