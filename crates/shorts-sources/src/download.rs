//! Asset downloads over plain HTTP.

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};

/// Fetches a remote asset into a local file.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> SourceResult<u64>;
}

/// Streaming HTTP downloader.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    http: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> SourceResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> SourceResult<u64> {
        debug!("Downloading {} -> {}", url, dest.display());

        let mut response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::download_failed(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = File::create(dest).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(SourceError::download_failed(format!("{} returned an empty body", url)));
        }

        info!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested").join("input_video.mp4");
        let downloader = HttpDownloader::new(Duration::from_secs(5)).unwrap();

        let written = downloader
            .download(&format!("{}/video.mp4", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(written, 4);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), vec![1u8, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_not_found_is_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = HttpDownloader::new(Duration::from_secs(5)).unwrap();
        let err = downloader
            .download(&format!("{}/missing.mp4", server.uri()), &dir.path().join("x.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::DownloadFailed(_)));
    }
}
