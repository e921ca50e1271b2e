//! FFmpeg filter strings for vertical clips.

use crate::plan::{CropWindow, TransformPlan};

/// Crop filter for a window in source pixels.
pub fn filter_crop(crop: &CropWindow) -> String {
    format!("crop={}:{}:{}:{}", crop.width, crop.height, crop.x, crop.y)
}

/// Scale filter to an exact output size.
pub fn filter_scale(width: u32, height: u32) -> String {
    format!("scale={}:{}", width, height)
}

/// Build the video filter chain for a plan: optional crop, resize, square pixels.
pub fn build_video_filter(plan: &TransformPlan) -> String {
    let mut chain = Vec::with_capacity(3);
    if let Some(crop) = &plan.crop {
        chain.push(filter_crop(crop));
    }
    chain.push(filter_scale(plan.output_width, plan.output_height));
    chain.push("setsar=1".to_string());
    chain.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::AudioFit;

    #[test]
    fn test_filter_with_crop() {
        let plan = TransformPlan {
            duration_secs: 7.5,
            crop: Some(CropWindow {
                width: 607,
                height: 1080,
                x: 656,
                y: 0,
            }),
            output_width: 720,
            output_height: 1280,
            audio: AudioFit::Silent,
        };
        assert_eq!(
            build_video_filter(&plan),
            "crop=607:1080:656:0,scale=720:1280,setsar=1"
        );
    }

    #[test]
    fn test_filter_without_crop() {
        let plan = TransformPlan {
            duration_secs: 5.0,
            crop: None,
            output_width: 720,
            output_height: 1280,
            audio: AudioFit::Silent,
        };
        assert_eq!(build_video_filter(&plan), "scale=720:1280,setsar=1");
    }
}
