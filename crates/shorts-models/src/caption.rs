//! Caption model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of hashtags in a caption.
pub const MAX_HASHTAGS: usize = 8;

/// Title plus hashtags attached to a finished clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub title: String,
    /// Hashtags including the leading `#`
    pub hashtags: Vec<String>,
}

impl Caption {
    /// Caption text: title, a blank line, then space-joined hashtags.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.title, self.hashtags.join(" "))
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_text_layout() {
        let caption = Caption {
            title: "Calm Forest".to_string(),
            hashtags: vec!["#forest".to_string(), "#nature".to_string()],
        };
        assert_eq!(caption.text(), "Calm Forest\n\n#forest #nature");
    }
}
