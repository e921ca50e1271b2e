//! Provider seams and query types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shorts_models::{AudioCandidate, ContentCandidate};

use crate::error::SourceResult;

/// Stock video search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoQuery {
    pub query: String,
    /// 1-based result page
    pub page: u32,
    pub per_page: u32,
}

impl VideoQuery {
    pub fn new(query: impl Into<String>, page: u32) -> Self {
        Self {
            query: query.into(),
            page: page.max(1),
            per_page: 10,
        }
    }
}

/// Ambient audio search, bounded by sound length in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioQuery {
    pub query: String,
    pub min_secs: u32,
    pub max_secs: u32,
}

impl AudioQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            min_secs: 10,
            max_secs: 60,
        }
    }
}

/// Returns candidates in provider order.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn search(&self, query: &VideoQuery) -> SourceResult<Vec<ContentCandidate>>;
}

/// May legitimately return no results.
#[async_trait]
pub trait AudioProvider: Send + Sync {
    async fn search(&self, query: &AudioQuery) -> SourceResult<Vec<AudioCandidate>>;
}
