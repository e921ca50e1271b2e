//! FFmpeg CLI wrapper for vertical clip rendering.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multiple inputs
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe inspection of video and audio sources
//! - Pure transform planning (duration, crop, resize, audio fit)
//! - The [`ClipRenderer`] seam and its FFmpeg implementation

pub mod command;
pub mod compose;
pub mod error;
pub mod filters;
pub mod plan;
pub mod probe;
pub mod progress;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{build_render_command, ClipRenderer, FfmpegRenderer, RenderRequest, RenderedClip};
pub use error::{MediaError, MediaResult};
pub use plan::{plan_transform, AudioFit, CropWindow, SourceGeometry, TransformPlan};
pub use probe::{probe_audio, probe_video, AudioInfo, VideoInfo};
pub use progress::FfmpegProgress;
