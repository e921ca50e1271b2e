//! Selection history.
//!
//! A UTF-8 text file with one content id per line, no header. The file is only
//! ever appended to; set membership is the only property read back.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use shorts_models::ContentId;

use crate::error::{StorageError, StorageResult};

/// Default history file name, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "history.txt";

/// File-backed set of content ids that were already used.
///
/// A single writer is assumed; concurrent runs need external locking.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_FILE)
    }
}

impl HistoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every recorded id. A missing file is an empty history.
    pub async fn load(&self) -> StorageResult<HashSet<ContentId>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("History file {} not found, starting empty", self.path.display());
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let ids: HashSet<ContentId> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ContentId::from)
            .collect();

        debug!("Loaded {} ids from {}", ids.len(), self.path.display());
        Ok(ids)
    }

    /// Append an id and sync it to disk before returning.
    pub async fn append(&self, id: &ContentId) -> StorageResult<()> {
        let line = id.as_str().trim();
        if line.is_empty() || line.contains(['\n', '\r']) {
            return Err(StorageError::invalid_key(format!("{:?}", id.as_str())));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;

        debug!("Recorded {} in {}", line, self.path.display());
        Ok(())
    }

    /// Whether an id has been recorded.
    pub async fn contains(&self, id: &ContentId) -> StorageResult<bool> {
        Ok(self.load().await?.contains(id))
    }
}
