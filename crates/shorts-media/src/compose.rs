//! Vertical clip composition.
//!
//! Probes the sources, builds a [`TransformPlan`] and renders it with a single
//! FFmpeg pass: crop, resize, trim and audio fit at once.

use async_trait::async_trait;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use shorts_models::{EncodingConfig, TransformSpec};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::build_video_filter;
use crate::plan::{plan_transform, AudioFit, SourceGeometry, TransformPlan};
use crate::probe::{probe_audio, probe_video};

/// Sources and destination for one render.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub video: PathBuf,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
}

/// A finished clip.
#[derive(Debug, Clone)]
pub struct RenderedClip {
    pub path: PathBuf,
    pub plan: TransformPlan,
    /// Why a supplied audio source was left out, if it was
    pub audio_dropped: Option<String>,
}

/// Turns a source video and optional audio into a finished clip.
#[async_trait]
pub trait ClipRenderer: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> MediaResult<RenderedClip>;
}

/// FFmpeg-backed renderer.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRenderer {
    spec: TransformSpec,
    encoding: EncodingConfig,
    timeout_secs: Option<u64>,
}

impl FfmpegRenderer {
    pub fn new(spec: TransformSpec, encoding: EncodingConfig) -> Self {
        Self {
            spec,
            encoding,
            timeout_secs: None,
        }
    }

    /// Kill FFmpeg if a render takes longer than `secs`.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn spec(&self) -> &TransformSpec {
        &self.spec
    }

    fn runner(&self) -> FfmpegRunner {
        match self.timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        }
    }
}

#[async_trait]
impl ClipRenderer for FfmpegRenderer {
    async fn render(&self, request: &RenderRequest) -> MediaResult<RenderedClip> {
        let video_info = probe_video(&request.video).await?;
        info!(
            width = video_info.width,
            height = video_info.height,
            duration = video_info.duration,
            "Probed source video {}",
            request.video.display()
        );

        // Unreadable audio downgrades to a silent clip
        let mut audio_dropped = None;
        let audio = match &request.audio {
            Some(path) => match probe_audio(path).await {
                Ok(info) => Some((path.as_path(), info.duration)),
                Err(e) => {
                    warn!("Audio source {} unusable, rendering silent: {}", path.display(), e);
                    audio_dropped = Some(e.to_string());
                    None
                }
            },
            None => None,
        };

        let plan = plan_transform(
            SourceGeometry::from(&video_info),
            audio.map(|(_, secs)| secs),
            &self.spec,
        )?;
        debug!(?plan, "Transform plan");

        if let Some(parent) = request.output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let audio_path = audio.map(|(path, _)| path);
        let total_secs = plan.duration_secs;
        let (plan, render_dropped) = run_with_silent_fallback(plan, |plan| {
            let cmd = build_render_command(
                &request.video,
                audio_path,
                &request.output,
                &plan,
                &self.encoding,
            );
            let runner = self.runner();
            async move {
                runner
                    .run_with_progress(&cmd, move |progress| {
                        debug!(
                            "Render progress: {:.0}% ({:.2}x)",
                            progress.percentage(total_secs),
                            progress.speed
                        );
                    })
                    .await
            }
        })
        .await?;
        let audio_dropped = audio_dropped.or(render_dropped);

        if !request.output.exists() {
            return Err(MediaError::FileNotFound(request.output.clone()));
        }

        info!(
            "Rendered {}x{} clip of {:.2}s to {}",
            plan.output_width,
            plan.output_height,
            plan.duration_secs,
            request.output.display()
        );

        Ok(RenderedClip {
            path: request.output.clone(),
            plan,
            audio_dropped,
        })
    }
}

/// Run `attempt` with `plan`. If FFmpeg fails while an audio track is
/// planned, try once more with the same plan made silent and report why the
/// audio was dropped.
async fn run_with_silent_fallback<F, Fut>(
    plan: TransformPlan,
    mut attempt: F,
) -> MediaResult<(TransformPlan, Option<String>)>
where
    F: FnMut(TransformPlan) -> Fut,
    Fut: Future<Output = MediaResult<()>>,
{
    match attempt(plan).await {
        Ok(()) => Ok((plan, None)),
        Err(e @ MediaError::FfmpegFailed { .. }) if plan.audio.has_audio() => {
            warn!("Render with audio failed, retrying silent: {}", e);
            let silent = TransformPlan {
                audio: AudioFit::Silent,
                ..plan
            };
            attempt(silent).await?;
            Ok((silent, Some(e.to_string())))
        }
        Err(e) => Err(e),
    }
}

/// Build the single-pass FFmpeg command for a plan.
///
/// The audio input, when present, replaces any audio in the source video.
pub fn build_render_command(
    video: &Path,
    audio: Option<&Path>,
    output: &Path,
    plan: &TransformPlan,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(video, output);

    let audio = audio.filter(|_| plan.audio.has_audio());
    if let Some(audio_path) = audio {
        cmd = cmd.add_input(audio_path);
        if matches!(plan.audio, AudioFit::Loop { .. }) {
            cmd = cmd.stream_loop(-1);
        }
    }

    cmd = cmd
        .video_filter(build_video_filter(plan))
        .map("0:v:0")
        .output_duration(plan.duration_secs)
        .video_encoding(encoding);

    cmd = match audio {
        Some(_) => cmd.map("1:a:0").audio_encoding(encoding),
        None => cmd.no_audio(),
    };

    cmd.faststart()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::CropWindow;

    fn plan(audio: AudioFit) -> TransformPlan {
        TransformPlan {
            duration_secs: 7.5,
            crop: Some(CropWindow {
                width: 607,
                height: 1080,
                x: 656,
                y: 0,
            }),
            output_width: 720,
            output_height: 1280,
            audio,
        }
    }

    fn position(args: &[String], needle: &str) -> Option<usize> {
        args.iter().position(|a| a == needle)
    }

    #[test]
    fn test_looped_audio_command() {
        let plan = plan(AudioFit::Loop {
            source_secs: 3.0,
            target_secs: 7.5,
        });
        let args = build_render_command(
            Path::new("in.mp4"),
            Some(Path::new("in.mp3")),
            Path::new("out.mp4"),
            &plan,
            &EncodingConfig::default(),
        )
        .build_args();

        let loop_pos = position(&args, "-stream_loop").unwrap();
        assert!(loop_pos < position(&args, "in.mp3").unwrap());
        assert!(args.contains(&"1:a:0".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"7.500".to_string()));
        assert!(!args.contains(&"-an".to_string()));
        assert!(args.contains(&"crop=607:1080:656:0,scale=720:1280,setsar=1".to_string()));
    }

    #[test]
    fn test_trimmed_audio_is_not_looped() {
        let plan = plan(AudioFit::Trim { target_secs: 7.5 });
        let args = build_render_command(
            Path::new("in.mp4"),
            Some(Path::new("in.mp3")),
            Path::new("out.mp4"),
            &plan,
            &EncodingConfig::default(),
        )
        .build_args();

        assert!(position(&args, "-stream_loop").is_none());
        assert!(args.contains(&"1:a:0".to_string()));
    }

    #[test]
    fn test_silent_command_drops_audio() {
        let plan = plan(AudioFit::Silent);
        let args = build_render_command(
            Path::new("in.mp4"),
            None,
            Path::new("out.mp4"),
            &plan,
            &EncodingConfig::default(),
        )
        .build_args();

        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"1:a:0".to_string()));
        assert!(!args.contains(&"aac".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
    }

    fn ffmpeg_failure() -> MediaError {
        MediaError::FfmpegFailed {
            message: "exit status 1".to_string(),
            stderr: Some("Invalid data found when processing input".to_string()),
            exit_code: Some(1),
        }
    }

    #[tokio::test]
    async fn test_audio_failure_retries_silent() {
        let mut attempts = Vec::new();
        let looped = plan(AudioFit::Loop {
            source_secs: 3.0,
            target_secs: 7.5,
        });

        let (rendered, dropped) = run_with_silent_fallback(looped, |plan| {
            attempts.push(plan.audio);
            let result = if plan.audio.has_audio() {
                Err(ffmpeg_failure())
            } else {
                Ok(())
            };
            async move { result }
        })
        .await
        .unwrap();

        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[1], AudioFit::Silent);
        assert_eq!(rendered.audio, AudioFit::Silent);
        assert_eq!(rendered.duration_secs, 7.5);
        assert!(dropped.unwrap().contains("exit status 1"));
    }

    #[tokio::test]
    async fn test_successful_render_keeps_audio() {
        let trimmed = plan(AudioFit::Trim { target_secs: 7.5 });
        let (rendered, dropped) = run_with_silent_fallback(trimmed, |_| async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(rendered, trimmed);
        assert!(dropped.is_none());
    }

    #[tokio::test]
    async fn test_silent_failure_is_not_retried() {
        let mut calls = 0;
        let err = run_with_silent_fallback(plan(AudioFit::Silent), |_| {
            calls += 1;
            async { Err(ffmpeg_failure()) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let mut calls = 0;
        let err = run_with_silent_fallback(plan(AudioFit::Trim { target_secs: 7.5 }), |_| {
            calls += 1;
            async { Err(MediaError::Timeout(30)) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::Timeout(30)));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_missing_video_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FfmpegRenderer::default();
        let request = RenderRequest {
            video: dir.path().join("missing.mp4"),
            audio: None,
            output: dir.path().join("out.mp4"),
        };
        let err = renderer.render(&request).await.unwrap_err();
        assert!(matches!(
            err,
            MediaError::FileNotFound(_) | MediaError::FfprobeNotFound
        ));
    }
}
