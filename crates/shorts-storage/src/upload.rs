//! Public upload collaborator.
//!
//! Link-based channels need a URL anyone can resolve. Catbox takes an
//! anonymous multipart upload and answers with the file URL as plain text.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Default Catbox endpoint.
pub const DEFAULT_CATBOX_BASE_URL: &str = "https://catbox.moe";

/// Uploads bytes and returns a publicly resolvable URL.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> StorageResult<String>;
}

/// Configuration for the Catbox uploader.
#[derive(Debug, Clone)]
pub struct CatboxConfig {
    /// Base URL, without the `/user/api.php` path
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for CatboxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATBOX_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Anonymous Catbox uploader.
#[derive(Debug, Clone)]
pub struct CatboxUploader {
    http: Client,
    config: CatboxConfig,
}

impl CatboxUploader {
    pub fn new(config: CatboxConfig) -> StorageResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/user/api.php", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Uploader for CatboxUploader {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> StorageResult<String> {
        let url = self.endpoint();
        debug!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), url);

        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("video/mp4")?;
        let form = Form::new()
            .text("reqtype", "fileupload")
            .part("fileToUpload", part);

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(StorageError::upload_failed(format!(
                "Catbox returned {}: {}",
                status,
                body.trim()
            )));
        }

        let public_url = body.trim();
        if !public_url.starts_with("http") {
            return Err(StorageError::upload_failed(format!(
                "Catbox response is not a URL: {}",
                public_url
            )));
        }

        info!("Uploaded {} to {}", file_name, public_url);
        Ok(public_url.to_string())
    }
}
