//! Nature shorts worker.
//!
//! This crate provides:
//! - Content selection against the history file
//! - Caption and hashtag generation
//! - Multi-channel distribution (Telegram, webhook)
//! - The pipeline orchestrator and its configuration

pub mod caption;
pub mod config;
pub mod distributor;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod selector;

pub use caption::CaptionGenerator;
pub use config::{DistributionConfig, PipelineConfig, TelegramConfig, WebhookConfig};
pub use distributor::{
    ChannelKind, ChannelOutcome, ChannelReport, DirectFileChannel, DistributionReport, Distributor,
    LinkPayload, LinkPayloadChannel,
};
pub use error::{WorkerError, WorkerResult};
pub use logging::RunLogger;
pub use pipeline::{AudioOutcome, Pipeline, PipelineParts, PipelineSettings, RunReport};
pub use selector::{ContentSelector, Selection, SelectionMode};
