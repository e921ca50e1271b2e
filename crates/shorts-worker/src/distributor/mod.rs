//! Multi-channel distribution of the finished clip.
//!
//! Direct-file channels receive the clip bytes. Link-payload channels receive
//! a public URL, obtained from the uploader at most once per run and only
//! when at least one link channel is configured. Channel failures are
//! isolated and reported, never propagated.

mod telegram;
mod webhook;

pub use telegram::{TelegramChannel, TELEGRAM_CAPTION_LIMIT};
pub use webhook::WebhookChannel;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use shorts_models::Caption;
use shorts_storage::Uploader;

use crate::config::DistributionConfig;
use crate::error::WorkerResult;

/// Channel that receives the clip bytes.
#[async_trait]
pub trait DirectFileChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send_file(&self, file_name: &str, bytes: &[u8], caption: &Caption) -> WorkerResult<()>;
}

/// Channel that receives a public URL.
#[async_trait]
pub trait LinkPayloadChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send_link(&self, payload: &LinkPayload) -> WorkerResult<()>;
}

/// JSON body for link channels.
///
/// `content` doubles as a Discord-compatible message so a Discord webhook URL
/// works without an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkPayload {
    pub video_url: String,
    pub caption: String,
    pub content: String,
    pub title: String,
    pub hashtags: Vec<String>,
}

impl LinkPayload {
    pub fn new(video_url: &str, caption: &Caption) -> Self {
        Self {
            video_url: video_url.to_string(),
            caption: caption.text(),
            content: format!("🌿 Daily Nature Dose: {}", video_url),
            title: caption.title.clone(),
            hashtags: caption.hashtags.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    DirectFile,
    LinkPayload,
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    Delivered,
    Skipped { reason: String },
    Failed { reason: String },
}

impl ChannelOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ChannelOutcome::Delivered => "delivered",
            ChannelOutcome::Skipped { .. } => "skipped",
            ChannelOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, ChannelOutcome::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub channel: String,
    pub kind: ChannelKind,
    pub outcome: ChannelOutcome,
}

/// Per-channel outcomes of one run. Observability only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistributionReport {
    pub channels: Vec<ChannelReport>,
    /// Public URL, when an upload happened and succeeded
    pub public_url: Option<String>,
}

impl DistributionReport {
    pub fn outcome_for(&self, channel: &str) -> Option<&ChannelOutcome> {
        self.channels
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| &r.outcome)
    }

    pub fn delivered_count(&self) -> usize {
        self.channels.iter().filter(|r| r.outcome.is_delivered()).count()
    }

    fn record(&mut self, channel: &str, kind: ChannelKind, outcome: ChannelOutcome) {
        metrics::counter!(
            "shorts_distribution_total",
            "channel" => channel.to_string(),
            "outcome" => outcome.label()
        )
        .increment(1);

        match &outcome {
            ChannelOutcome::Delivered => info!(channel, "Delivered clip"),
            ChannelOutcome::Skipped { reason } => warn!(channel, "Skipped channel: {}", reason),
            ChannelOutcome::Failed { reason } => warn!(channel, "Channel failed: {}", reason),
        }

        self.channels.push(ChannelReport {
            channel: channel.to_string(),
            kind,
            outcome,
        });
    }
}

/// Sends a finished clip to every configured channel.
pub struct Distributor {
    direct: Vec<Box<dyn DirectFileChannel>>,
    link: Vec<Box<dyn LinkPayloadChannel>>,
    uploader: Box<dyn Uploader>,
}

impl Distributor {
    /// Distributor with no channels.
    pub fn new(uploader: Box<dyn Uploader>) -> Self {
        Self {
            direct: Vec::new(),
            link: Vec::new(),
            uploader,
        }
    }

    /// Build channels for whatever the config has credentials for.
    pub fn from_config(
        config: &DistributionConfig,
        uploader: Box<dyn Uploader>,
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let mut distributor = Self::new(uploader);

        if let Some(telegram) = &config.telegram {
            distributor = distributor.with_direct_channel(TelegramChannel::new(telegram.clone(), timeout)?);
        }
        if let Some(webhook) = &config.webhook {
            distributor = distributor.with_link_channel(WebhookChannel::new(webhook.clone(), timeout)?);
        }

        Ok(distributor)
    }

    pub fn with_direct_channel(mut self, channel: impl DirectFileChannel + 'static) -> Self {
        self.direct.push(Box::new(channel));
        self
    }

    pub fn with_link_channel(mut self, channel: impl LinkPayloadChannel + 'static) -> Self {
        self.link.push(Box::new(channel));
        self
    }

    pub fn channel_count(&self) -> usize {
        self.direct.len() + self.link.len()
    }

    /// Deliver `clip` to every channel, direct-file channels first.
    pub async fn distribute(&self, clip: &Path, caption: &Caption) -> DistributionReport {
        let mut report = DistributionReport::default();

        if self.channel_count() == 0 {
            info!("No distribution channels configured");
            return report;
        }

        let bytes = match tokio::fs::read(clip).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let reason = format!("failed to read {}: {}", clip.display(), e);
                for channel in &self.direct {
                    report.record(channel.name(), ChannelKind::DirectFile, ChannelOutcome::Failed { reason: reason.clone() });
                }
                for channel in &self.link {
                    report.record(channel.name(), ChannelKind::LinkPayload, ChannelOutcome::Failed { reason: reason.clone() });
                }
                return report;
            }
        };

        let file_name = clip
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip.mp4".to_string());

        for channel in &self.direct {
            let outcome = match channel.send_file(&file_name, &bytes, caption).await {
                Ok(()) => ChannelOutcome::Delivered,
                Err(e) => ChannelOutcome::Failed { reason: e.to_string() },
            };
            report.record(channel.name(), ChannelKind::DirectFile, outcome);
        }

        if self.link.is_empty() {
            return report;
        }

        let upload = self.uploader.upload(&file_name, &bytes).await;
        let payload = match upload {
            Ok(url) => {
                report.public_url = Some(url.clone());
                Ok(LinkPayload::new(&url, caption))
            }
            Err(e) => {
                warn!("Upload failed, link channels will be skipped: {}", e);
                Err(format!("upload failed: {}", e))
            }
        };

        for channel in &self.link {
            let outcome = match &payload {
                Ok(payload) => match channel.send_link(payload).await {
                    Ok(()) => ChannelOutcome::Delivered,
                    Err(e) => ChannelOutcome::Failed { reason: e.to_string() },
                },
                Err(reason) => ChannelOutcome::Skipped { reason: reason.clone() },
            };
            report.record(channel.name(), ChannelKind::LinkPayload, outcome);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use shorts_storage::{StorageError, StorageResult};
    use tempfile::TempDir;

    use crate::error::WorkerError;

    fn caption() -> Caption {
        Caption {
            title: "Forest Vibes 🌿".to_string(),
            hashtags: vec!["#forest".to_string(), "#nature".to_string()],
        }
    }

    struct FakeUploader {
        result: Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Uploader for FakeUploader {
        async fn upload(&self, _file_name: &str, _bytes: &[u8]) -> StorageResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(StorageError::upload_failed)
        }
    }

    fn uploader(result: Result<&str, &str>) -> (Box<dyn Uploader>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fake = FakeUploader {
            result: result.map(str::to_string).map_err(str::to_string),
            calls: calls.clone(),
        };
        (Box::new(fake), calls)
    }

    /// Records the order channels were called in.
    #[derive(Clone)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    struct FakeDirect {
        name: String,
        fail: bool,
        log: Recorder,
    }

    #[async_trait]
    impl DirectFileChannel for FakeDirect {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send_file(&self, _file_name: &str, bytes: &[u8], _caption: &Caption) -> WorkerResult<()> {
            self.log.0.lock().unwrap().push(format!("{}:{}", self.name, bytes.len()));
            if self.fail {
                Err(WorkerError::delivery_failed("boom"))
            } else {
                Ok(())
            }
        }
    }

    struct FakeLink {
        name: String,
        log: Recorder,
        payloads: Arc<Mutex<Vec<LinkPayload>>>,
    }

    #[async_trait]
    impl LinkPayloadChannel for FakeLink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send_link(&self, payload: &LinkPayload) -> WorkerResult<()> {
            self.log.0.lock().unwrap().push(self.name.clone());
            self.payloads.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn clip(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("final_output.mp4");
        std::fs::write(&path, b"fake mp4 bytes").unwrap();
        path
    }

    #[test]
    fn test_link_payload_shape() {
        let payload = LinkPayload::new("https://files.example/abc.mp4", &caption());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["video_url"], "https://files.example/abc.mp4");
        assert_eq!(json["content"], "🌿 Daily Nature Dose: https://files.example/abc.mp4");
        assert_eq!(json["caption"], "Forest Vibes 🌿\n\n#forest #nature");
        assert_eq!(json["hashtags"][0], "#forest");
    }

    #[tokio::test]
    async fn test_direct_channels_run_before_link_channels() {
        let dir = TempDir::new().unwrap();
        let log = Recorder(Arc::new(Mutex::new(Vec::new())));
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let (uploader, upload_calls) = uploader(Ok("https://files.example/abc.mp4"));

        let distributor = Distributor::new(uploader)
            .with_link_channel(FakeLink { name: "hook".into(), log: log.clone(), payloads: payloads.clone() })
            .with_direct_channel(FakeDirect { name: "tg".into(), fail: false, log: log.clone() });

        let report = distributor.distribute(&clip(&dir), &caption()).await;

        assert_eq!(*log.0.lock().unwrap(), vec!["tg:14".to_string(), "hook".to_string()]);
        assert_eq!(report.delivered_count(), 2);
        assert_eq!(report.public_url.as_deref(), Some("https://files.example/abc.mp4"));
        assert_eq!(upload_calls.load(Ordering::SeqCst), 1);
        assert_eq!(payloads.lock().unwrap()[0].video_url, "https://files.example/abc.mp4");
    }

    #[tokio::test]
    async fn test_upload_happens_once_for_all_link_channels() {
        let dir = TempDir::new().unwrap();
        let log = Recorder(Arc::new(Mutex::new(Vec::new())));
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let (uploader, upload_calls) = uploader(Ok("https://files.example/abc.mp4"));

        let distributor = Distributor::new(uploader)
            .with_link_channel(FakeLink { name: "a".into(), log: log.clone(), payloads: payloads.clone() })
            .with_link_channel(FakeLink { name: "b".into(), log: log.clone(), payloads: payloads.clone() });

        let report = distributor.distribute(&clip(&dir), &caption()).await;

        assert_eq!(upload_calls.load(Ordering::SeqCst), 1);
        assert_eq!(payloads.lock().unwrap().len(), 2);
        assert_eq!(report.delivered_count(), 2);
    }

    #[tokio::test]
    async fn test_upload_failure_skips_link_channels() {
        let dir = TempDir::new().unwrap();
        let log = Recorder(Arc::new(Mutex::new(Vec::new())));
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let (uploader, _) = uploader(Err("catbox down"));

        let distributor = Distributor::new(uploader)
            .with_direct_channel(FakeDirect { name: "tg".into(), fail: false, log: log.clone() })
            .with_link_channel(FakeLink { name: "hook".into(), log: log.clone(), payloads: payloads.clone() });

        let report = distributor.distribute(&clip(&dir), &caption()).await;

        assert!(payloads.lock().unwrap().is_empty());
        assert_eq!(report.outcome_for("tg"), Some(&ChannelOutcome::Delivered));
        assert!(matches!(report.outcome_for("hook"), Some(ChannelOutcome::Skipped { .. })));
        assert!(report.public_url.is_none());
    }

    #[tokio::test]
    async fn test_no_upload_without_link_channels() {
        let dir = TempDir::new().unwrap();
        let log = Recorder(Arc::new(Mutex::new(Vec::new())));
        let (uploader, upload_calls) = uploader(Ok("https://files.example/abc.mp4"));

        let distributor = Distributor::new(uploader)
            .with_direct_channel(FakeDirect { name: "tg".into(), fail: true, log: log.clone() });

        let report = distributor.distribute(&clip(&dir), &caption()).await;

        assert_eq!(upload_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(report.outcome_for("tg"), Some(ChannelOutcome::Failed { .. })));
    }

    #[tokio::test]
    async fn test_missing_clip_fails_every_channel() {
        let dir = TempDir::new().unwrap();
        let log = Recorder(Arc::new(Mutex::new(Vec::new())));
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let (uploader, upload_calls) = uploader(Ok("https://files.example/abc.mp4"));

        let distributor = Distributor::new(uploader)
            .with_direct_channel(FakeDirect { name: "tg".into(), fail: false, log: log.clone() })
            .with_link_channel(FakeLink { name: "hook".into(), log: log.clone(), payloads });

        let report = distributor
            .distribute(&dir.path().join("missing.mp4"), &caption())
            .await;

        assert_eq!(report.channels.len(), 2);
        assert!(report.channels.iter().all(|r| r.outcome.label() == "failed"));
        assert_eq!(upload_calls.load(Ordering::SeqCst), 0);
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_channels_is_empty_report() {
        let (uploader, upload_calls) = uploader(Ok("https://files.example/abc.mp4"));
        let report = Distributor::new(uploader)
            .distribute(Path::new("/nonexistent/clip.mp4"), &caption())
            .await;

        assert!(report.channels.is_empty());
        assert_eq!(upload_calls.load(Ordering::SeqCst), 0);
    }
}
