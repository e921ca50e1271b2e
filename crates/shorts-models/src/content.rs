//! Content candidates produced by the external providers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a stock video.
///
/// Providers hand out integer ids; they are kept as their decimal text so the
/// history file stays a plain list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A stock video offered by the video provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCandidate {
    /// Provider identifier
    pub id: ContentId,
    /// Free-text, comma-separated tags
    #[serde(default)]
    pub tags: String,
    /// Where the video file can be downloaded from
    pub download_url: String,
}

impl ContentCandidate {
    pub fn new(id: impl Into<ContentId>, tags: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: tags.into(),
            download_url: download_url.into(),
        }
    }
}

/// An ambient sound offered by the audio provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioCandidate {
    /// Provider identifier
    pub id: String,
    /// Human readable sound name
    pub name: String,
    /// Preview file location (HQ mp3)
    pub preview_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_from_integer() {
        let id = ContentId::from(42u64);
        assert_eq!(id.as_str(), "42");
        assert_eq!(id, ContentId::from("42"));
    }

    #[test]
    fn test_content_id_serializes_transparently() {
        let json = serde_json::to_string(&ContentId::from("123")).unwrap();
        assert_eq!(json, "\"123\"");
    }

    #[test]
    fn test_candidate_tags_default_to_empty() {
        let candidate: ContentCandidate =
            serde_json::from_str(r#"{"id":"7","download_url":"https://example.com/v.mp4"}"#).unwrap();
        assert!(candidate.tags.is_empty());
    }
}
