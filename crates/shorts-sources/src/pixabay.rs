//! Pixabay videos API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use shorts_models::{ContentCandidate, ContentId};

use crate::error::{SourceError, SourceResult};
use crate::types::{VideoProvider, VideoQuery};

/// Default Pixabay endpoint.
pub const DEFAULT_PIXABAY_BASE_URL: &str = "https://pixabay.com";

/// Configuration for the Pixabay client.
#[derive(Debug, Clone)]
pub struct PixabayConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl PixabayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_PIXABAY_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Video search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    id: u64,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    videos: Renditions,
}

#[derive(Debug, Default, Deserialize)]
struct Renditions {
    large: Option<Rendition>,
    medium: Option<Rendition>,
    small: Option<Rendition>,
    tiny: Option<Rendition>,
}

#[derive(Debug, Deserialize)]
struct Rendition {
    #[serde(default)]
    url: String,
}

impl Renditions {
    /// Largest rendition with a usable URL. Pixabay leaves `url` empty when a
    /// size is not available.
    fn best_url(&self) -> Option<&str> {
        [&self.large, &self.medium, &self.small, &self.tiny]
            .into_iter()
            .flatten()
            .map(|r| r.url.as_str())
            .find(|url| !url.is_empty())
    }
}

/// Pixabay stock video client.
#[derive(Debug, Clone)]
pub struct PixabayClient {
    http: Client,
    config: PixabayConfig,
}

impl PixabayClient {
    pub fn new(config: PixabayConfig) -> SourceResult<Self> {
        if config.api_key.is_empty() {
            return Err(SourceError::NotConfigured("Pixabay API key is empty".to_string()));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/videos/", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl VideoProvider for PixabayClient {
    async fn search(&self, query: &VideoQuery) -> SourceResult<Vec<ContentCandidate>> {
        let url = self.endpoint();
        debug!(query = %query.query, page = query.page, "Searching Pixabay videos");

        let per_page = query.per_page.to_string();
        let page = query.page.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("q", query.query.as_str()),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::request_failed(format!(
                "Pixabay returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: SearchResponse = response.json().await?;
        let candidates = body
            .hits
            .into_iter()
            .filter_map(|hit| match hit.videos.best_url() {
                Some(url) => Some(ContentCandidate::new(ContentId::from(hit.id), hit.tags.clone(), url)),
                None => {
                    warn!("Pixabay video {} has no downloadable rendition, skipping", hit.id);
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!("Pixabay returned {} candidates", candidates.len());
        Ok(candidates)
    }
}
