//! Freesound text search client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use shorts_models::AudioCandidate;

use crate::error::{SourceError, SourceResult};
use crate::types::{AudioProvider, AudioQuery};

/// Default Freesound endpoint.
pub const DEFAULT_FREESOUND_BASE_URL: &str = "https://freesound.org";

/// Configuration for the Freesound client.
#[derive(Debug, Clone)]
pub struct FreesoundConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl FreesoundConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_FREESOUND_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SoundResult>,
}

#[derive(Debug, Deserialize)]
struct SoundResult {
    id: u64,
    #[serde(default)]
    name: String,
    previews: Option<Previews>,
}

#[derive(Debug, Deserialize)]
struct Previews {
    #[serde(rename = "preview-hq-mp3")]
    hq_mp3: Option<String>,
}

/// Freesound ambient audio client.
#[derive(Debug, Clone)]
pub struct FreesoundClient {
    http: Client,
    config: FreesoundConfig,
}

impl FreesoundClient {
    pub fn new(config: FreesoundConfig) -> SourceResult<Self> {
        if config.api_key.is_empty() {
            return Err(SourceError::NotConfigured("Freesound API key is empty".to_string()));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/apiv2/search/text/", self.config.base_url.trim_end_matches('/'))
    }
}

/// Freesound range filter on sound length.
fn duration_filter(query: &AudioQuery) -> String {
    format!("duration:[{} TO {}]", query.min_secs, query.max_secs)
}

#[async_trait]
impl AudioProvider for FreesoundClient {
    async fn search(&self, query: &AudioQuery) -> SourceResult<Vec<AudioCandidate>> {
        let url = self.endpoint();
        let filter = duration_filter(query);
        debug!(query = %query.query, %filter, "Searching Freesound");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query.query.as_str()),
                ("fields", "id,name,previews"),
                ("token", self.config.api_key.as_str()),
                ("filter", filter.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::request_failed(format!(
                "Freesound returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: SearchResponse = response.json().await?;
        let candidates = body
            .results
            .into_iter()
            .filter_map(|sound| {
                let preview_url = sound.previews?.hq_mp3.filter(|url| !url.is_empty())?;
                Some(AudioCandidate {
                    id: sound.id.to_string(),
                    name: sound.name,
                    preview_url,
                })
            })
            .collect::<Vec<_>>();

        debug!("Freesound returned {} sounds", candidates.len());
        Ok(candidates)
    }
}
