//! Clients for the external content providers.
//!
//! This crate provides:
//! - The stock video provider (Pixabay videos API)
//! - The ambient audio provider (Freesound text search)
//! - A plain HTTP downloader for the selected assets
//!
//! Each collaborator sits behind a trait so the pipeline can run against fakes.

pub mod download;
pub mod error;
pub mod freesound;
pub mod pixabay;
pub mod types;

pub use download::{Downloader, HttpDownloader};
pub use error::{SourceError, SourceResult};
pub use freesound::{FreesoundClient, FreesoundConfig};
pub use pixabay::{PixabayClient, PixabayConfig};
pub use types::{AudioProvider, AudioQuery, VideoProvider, VideoQuery};
