//! Pipeline configuration.
//!
//! Built once from the environment and passed into the orchestrator and the
//! distributor. Missing channel settings disable the channel; only the video
//! provider key is mandatory.

use std::path::PathBuf;
use std::time::Duration;

use shorts_models::{EncodingConfig, TransformSpec};
use shorts_storage::{DEFAULT_CATBOX_BASE_URL, DEFAULT_HISTORY_FILE};

use crate::error::{WorkerError, WorkerResult};

/// Default Telegram Bot API endpoint.
pub const DEFAULT_TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

/// Direct-file channel credentials (Telegram bot).
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub base_url: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Link-payload channel endpoint (generic webhook).
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
}

/// Provider and uploader endpoints, overridable for staging and tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub pixabay: String,
    pub freesound: String,
    pub catbox: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            pixabay: shorts_sources::pixabay::DEFAULT_PIXABAY_BASE_URL.to_string(),
            freesound: shorts_sources::freesound::DEFAULT_FREESOUND_BASE_URL.to_string(),
            catbox: DEFAULT_CATBOX_BASE_URL.to_string(),
        }
    }
}

/// Distribution channel settings.
#[derive(Debug, Clone, Default)]
pub struct DistributionConfig {
    pub telegram: Option<TelegramConfig>,
    pub webhook: Option<WebhookConfig>,
}

/// Full pipeline configuration.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Pixabay key (required)
    pub video_provider_key: Option<String>,
    /// Freesound token; absent means silent clips
    pub audio_provider_key: Option<String>,
    pub distribution: DistributionConfig,
    pub endpoints: Endpoints,
    /// Append-only history of used video ids
    pub history_file: PathBuf,
    /// Where the finished clip is written
    pub output_path: PathBuf,
    /// Parent for the per-run temporary directory
    pub work_dir: Option<PathBuf>,
    pub video_query: String,
    pub audio_query: String,
    /// Result pages to pick from at random (1..=max_page)
    pub max_page: u32,
    pub per_page: u32,
    pub http_timeout: Duration,
    pub render_timeout_secs: Option<u64>,
    pub transform: TransformSpec,
    pub encoding: EncodingConfig,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("video_provider_key", &self.video_provider_key.as_ref().map(|_| "<set>"))
            .field("audio_provider_key", &self.audio_provider_key.as_ref().map(|_| "<set>"))
            .field("distribution", &self.distribution)
            .field("endpoints", &self.endpoints)
            .field("history_file", &self.history_file)
            .field("output_path", &self.output_path)
            .field("work_dir", &self.work_dir)
            .field("video_query", &self.video_query)
            .field("audio_query", &self.audio_query)
            .field("max_page", &self.max_page)
            .field("per_page", &self.per_page)
            .field("http_timeout", &self.http_timeout)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video_provider_key: None,
            audio_provider_key: None,
            distribution: DistributionConfig::default(),
            endpoints: Endpoints::default(),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            output_path: PathBuf::from("final_output.mp4"),
            work_dir: None,
            video_query: "nature".to_string(),
            audio_query: "nature".to_string(),
            max_page: 20,
            per_page: 10,
            http_timeout: Duration::from_secs(120),
            render_timeout_secs: None,
            transform: TransformSpec::default(),
            encoding: EncodingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let telegram = match (get("TELEGRAM_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token,
                chat_id,
                base_url: get("TELEGRAM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_BASE_URL.to_string()),
            }),
            _ => None,
        };

        let webhook = get("WEBHOOK_URL").map(|url| WebhookConfig { url });

        let endpoints = Endpoints {
            pixabay: get("PIXABAY_BASE_URL").unwrap_or(defaults.endpoints.pixabay),
            freesound: get("FREESOUND_BASE_URL").unwrap_or(defaults.endpoints.freesound),
            catbox: get("CATBOX_BASE_URL").unwrap_or(defaults.endpoints.catbox),
        };

        Self {
            video_provider_key: get("PIXABAY_KEY"),
            audio_provider_key: get("FREESOUND_KEY"),
            distribution: DistributionConfig { telegram, webhook },
            endpoints,
            history_file: get("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
            output_path: get("OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            work_dir: get("WORK_DIR").map(PathBuf::from),
            video_query: get("VIDEO_QUERY").unwrap_or(defaults.video_query),
            audio_query: get("AUDIO_QUERY").unwrap_or(defaults.audio_query),
            max_page: defaults.max_page,
            per_page: defaults.per_page,
            http_timeout: get("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            render_timeout_secs: get("RENDER_TIMEOUT_SECS").and_then(|s| s.parse().ok()),
            transform: defaults.transform,
            encoding: defaults.encoding,
        }
    }

    /// The video provider key, or a configuration error.
    pub fn require_video_provider_key(&self) -> WorkerResult<&str> {
        self.video_provider_key
            .as_deref()
            .ok_or_else(|| WorkerError::config_error("PIXABAY_KEY is not set"))
    }
}
