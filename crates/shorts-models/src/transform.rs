//! Target geometry and timing for vertical clips.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default clip length in seconds.
pub const DEFAULT_TARGET_DURATION_SECS: f64 = 7.5;
/// Sources shorter than this are used in full.
pub const DEFAULT_MIN_DURATION_SECS: f64 = 7.0;
/// Output frame height in pixels.
pub const DEFAULT_TARGET_HEIGHT: u32 = 1280;

/// Aspect ratio as an integer fraction (`width:height`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Portrait 9:16.
    pub const PORTRAIT: AspectRatio = AspectRatio { width: 9, height: 16 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether a `w x h` frame is wider than this ratio.
    ///
    /// Compared by cross-multiplication so exact 9:16 sources are never cropped
    /// because of float rounding.
    pub fn frame_is_wider(&self, w: u32, h: u32) -> bool {
        (w as u64) * (self.height as u64) > (h as u64) * (self.width as u64)
    }

    /// Widest width of this ratio that fits in `height` pixels (floored).
    pub fn width_for_height(&self, height: u32) -> u32 {
        ((height as u64 * self.width as u64) / self.height as u64) as u32
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Fixed transform parameters, constant for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Clip length when the source is long enough
    pub target_duration_secs: f64,
    /// Sources shorter than this are kept at full length
    pub min_duration_secs: f64,
    /// Target aspect ratio
    pub target_aspect: AspectRatio,
    /// Output height after resize
    pub target_height: u32,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            target_duration_secs: DEFAULT_TARGET_DURATION_SECS,
            min_duration_secs: DEFAULT_MIN_DURATION_SECS,
            target_aspect: AspectRatio::PORTRAIT,
            target_height: DEFAULT_TARGET_HEIGHT,
        }
    }
}
