//! Geometry and timing decisions for a vertical clip.
//!
//! Everything here is pure: the plan is computed from probed source
//! properties and a [`TransformSpec`], then handed to the FFmpeg layer.
//!
//! Steps, in order:
//! 1. Duration resolution
//! 2. Aspect normalization (symmetric horizontal crop)
//! 3. Resize to the target height
//! 4. Trim to the resolved duration
//! 5. Audio fit (loop or trim, or silent)

use serde::{Deserialize, Serialize};

use shorts_models::TransformSpec;

use crate::error::{MediaError, MediaResult};
use crate::probe::VideoInfo;

/// Source properties the plan depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceGeometry {
    pub width: u32,
    pub height: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl From<&VideoInfo> for SourceGeometry {
    fn from(info: &VideoInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            duration: info.duration,
        }
    }
}

/// Crop rectangle in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// How the audio track is fitted to the clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AudioFit {
    /// No audio track in the output
    Silent,
    /// Source is shorter than the clip: loop it, then cut at the clip length
    Loop { source_secs: f64, target_secs: f64 },
    /// Source is long enough: keep the leading part
    Trim { target_secs: f64 },
}

impl AudioFit {
    pub fn has_audio(&self) -> bool {
        !matches!(self, AudioFit::Silent)
    }
}

/// Complete transform plan for one clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformPlan {
    /// Output length in seconds
    pub duration_secs: f64,
    /// Crop applied before resizing, `None` when the source is already narrow enough
    pub crop: Option<CropWindow>,
    /// Output width after resize
    pub output_width: u32,
    /// Output height after resize
    pub output_height: u32,
    pub audio: AudioFit,
}

/// Resolve the clip length.
///
/// Sources shorter than the floor are used in full. Otherwise the target
/// length is used, clamped to the source length so the trim never asks for
/// more than exists.
pub fn resolve_duration(video_secs: f64, spec: &TransformSpec) -> f64 {
    if video_secs < spec.min_duration_secs {
        video_secs
    } else {
        spec.target_duration_secs.min(video_secs)
    }
}

/// Horizontal crop to the target aspect ratio.
///
/// Only sources wider than the target ratio are cropped. Narrower or equal
/// sources are returned unchanged (no crop, no padding), so their output
/// ratio stays the source ratio.
pub fn plan_crop(width: u32, height: u32, spec: &TransformSpec) -> Option<CropWindow> {
    let aspect = spec.target_aspect;
    if !aspect.frame_is_wider(width, height) {
        return None;
    }

    let new_width = aspect.width_for_height(height).max(1);
    Some(CropWindow {
        width: new_width,
        height,
        x: (width - new_width) / 2,
        y: 0,
    })
}

/// Output size for a frame scaled to `target_height`, keeping its aspect.
///
/// The width is rounded to the nearest even number as required by 4:2:0
/// chroma subsampling.
pub fn plan_resize(width: u32, height: u32, target_height: u32) -> (u32, u32) {
    let exact = width as f64 * target_height as f64 / height as f64;
    let even = ((exact / 2.0).round() as u32).saturating_mul(2).max(2);
    (even, target_height)
}

/// Decide how to fit an optional audio source to `target_secs`.
pub fn plan_audio(audio_secs: Option<f64>, target_secs: f64) -> AudioFit {
    match audio_secs {
        None => AudioFit::Silent,
        Some(source_secs) if source_secs < target_secs => AudioFit::Loop {
            source_secs,
            target_secs,
        },
        Some(_) => AudioFit::Trim { target_secs },
    }
}

/// Build the full plan for a source video and optional audio.
pub fn plan_transform(
    source: SourceGeometry,
    audio_secs: Option<f64>,
    spec: &TransformSpec,
) -> MediaResult<TransformPlan> {
    if source.width == 0 || source.height == 0 {
        return Err(MediaError::invalid_video(format!(
            "Cannot transform a {}x{} frame",
            source.width, source.height
        )));
    }
    if !(source.duration.is_finite() && source.duration > 0.0) {
        return Err(MediaError::invalid_video(format!(
            "Cannot transform a video of {} seconds",
            source.duration
        )));
    }

    let duration_secs = resolve_duration(source.duration, spec);
    let crop = plan_crop(source.width, source.height, spec);
    let (cropped_width, cropped_height) = crop
        .map(|c| (c.width, c.height))
        .unwrap_or((source.width, source.height));
    let (output_width, output_height) =
        plan_resize(cropped_width, cropped_height, spec.target_height);

    Ok(TransformPlan {
        duration_secs,
        crop,
        output_width,
        output_height,
        audio: plan_audio(audio_secs, duration_secs),
    })
}
