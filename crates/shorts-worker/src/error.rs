//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("No candidates returned by the video provider")]
    NoCandidates,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] shorts_storage::StorageError),

    #[error("Provider error: {0}")]
    Source(#[from] shorts_sources::SourceError),

    #[error("Media error: {0}")]
    Media(#[from] shorts_media::MediaError),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// The Telegram bot token is part of the request path.
impl From<reqwest::Error> for WorkerError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn delivery_failed(msg: impl Into<String>) -> Self {
        Self::DeliveryFailed(msg.into())
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::NoCandidates => "no_candidates",
            WorkerError::ConfigError(_) => "config",
            WorkerError::DownloadFailed(_) => "download",
            WorkerError::DeliveryFailed(_) => "delivery",
            WorkerError::Storage(_) => "storage",
            WorkerError::Source(_) => "provider",
            WorkerError::Media(_) => "media",
            WorkerError::Http(_) => "http",
            WorkerError::Io(_) => "io",
        }
    }
}
