//! Durable pipeline state and public uploads.
//!
//! This crate provides:
//! - The append-only selection history file
//! - The upload collaborator that turns a finished clip into a public URL

pub mod error;
pub mod history;
pub mod upload;

pub use error::{StorageError, StorageResult};
pub use history::{HistoryStore, DEFAULT_HISTORY_FILE};
pub use upload::{CatboxConfig, CatboxUploader, Uploader, DEFAULT_CATBOX_BASE_URL};
