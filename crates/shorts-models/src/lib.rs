//! Shared data models for the nature shorts pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Content candidates returned by the stock video and audio providers
//! - The fixed transform parameters for vertical clips
//! - Encoding configuration
//! - Captions

pub mod caption;
pub mod content;
pub mod encoding;
pub mod transform;

// Re-export common types
pub use caption::{Caption, MAX_HASHTAGS};
pub use content::{AudioCandidate, ContentCandidate, ContentId};
pub use encoding::EncodingConfig;
pub use transform::{AspectRatio, TransformSpec};
