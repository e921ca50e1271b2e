//! Pipeline orchestrator.
//!
//! One run: search, select and record, download, fetch audio, render,
//! caption, distribute. Every step is awaited in order. Audio and
//! distribution degrade instead of failing the run.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;
use tracing::Instrument;

use shorts_media::{ClipRenderer, FfmpegRenderer, RenderRequest, TransformPlan};
use shorts_models::{Caption, ContentId};
use shorts_sources::{
    AudioProvider, AudioQuery, Downloader, FreesoundClient, FreesoundConfig, HttpDownloader,
    PixabayClient, PixabayConfig, VideoProvider, VideoQuery,
};
use shorts_storage::{CatboxConfig, CatboxUploader, HistoryStore};

use crate::caption::CaptionGenerator;
use crate::config::PipelineConfig;
use crate::distributor::{DistributionReport, Distributor};
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::selector::ContentSelector;

const VIDEO_FILE_NAME: &str = "input_video.mp4";
const AUDIO_FILE_NAME: &str = "input_audio.mp3";

/// What happened to the optional audio step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutcome {
    Attached { id: String, name: String },
    /// Not configured, or the provider had nothing
    Skipped { reason: String },
    /// Search, download or probe failed
    Failed { reason: String },
}

impl AudioOutcome {
    pub fn is_attached(&self) -> bool {
        matches!(self, AudioOutcome::Attached { .. })
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub content_id: ContentId,
    pub fallback_used: bool,
    pub output_path: PathBuf,
    pub plan: TransformPlan,
    pub caption: Caption,
    pub audio: AudioOutcome,
    pub distribution: DistributionReport,
}

/// Per-run parameters that are not collaborators.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub video_query: String,
    pub audio_query: String,
    pub max_page: u32,
    pub per_page: u32,
    pub output_path: PathBuf,
    pub work_dir: Option<PathBuf>,
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            video_query: config.video_query.clone(),
            audio_query: config.audio_query.clone(),
            max_page: config.max_page,
            per_page: config.per_page,
            output_path: config.output_path.clone(),
            work_dir: config.work_dir.clone(),
        }
    }
}

/// External collaborators of the orchestrator.
pub struct PipelineParts {
    pub video_provider: Box<dyn VideoProvider>,
    pub audio_provider: Option<Box<dyn AudioProvider>>,
    pub downloader: Box<dyn Downloader>,
    pub renderer: Box<dyn ClipRenderer>,
    pub history: HistoryStore,
    pub distributor: Distributor,
}

pub struct Pipeline {
    settings: PipelineSettings,
    video_provider: Box<dyn VideoProvider>,
    audio_provider: Option<Box<dyn AudioProvider>>,
    downloader: Box<dyn Downloader>,
    renderer: Box<dyn ClipRenderer>,
    selector: ContentSelector,
    captions: CaptionGenerator,
    distributor: Distributor,
    rng: StdRng,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings, parts: PipelineParts, rng: StdRng) -> Self {
        Self {
            settings,
            video_provider: parts.video_provider,
            audio_provider: parts.audio_provider,
            downloader: parts.downloader,
            renderer: parts.renderer,
            selector: ContentSelector::new(parts.history),
            captions: CaptionGenerator::new(),
            distributor: parts.distributor,
            rng,
        }
    }

    /// Wire the production collaborators from config.
    pub fn from_config(config: &PipelineConfig) -> WorkerResult<Self> {
        let video_key = config.require_video_provider_key()?;

        let video_provider = PixabayClient::new(PixabayConfig {
            api_key: video_key.to_string(),
            base_url: config.endpoints.pixabay.clone(),
            timeout: config.http_timeout,
        })?;

        let audio_provider = match &config.audio_provider_key {
            Some(key) => Some(Box::new(FreesoundClient::new(FreesoundConfig {
                api_key: key.clone(),
                base_url: config.endpoints.freesound.clone(),
                timeout: config.http_timeout,
            })?) as Box<dyn AudioProvider>),
            None => {
                tracing::info!("FREESOUND_KEY not set, clips will be silent");
                None
            }
        };

        let uploader = CatboxUploader::new(CatboxConfig {
            base_url: config.endpoints.catbox.clone(),
            timeout: config.http_timeout,
        })?;
        let distributor =
            Distributor::from_config(&config.distribution, Box::new(uploader), config.http_timeout)?;

        let renderer = FfmpegRenderer::new(config.transform, config.encoding.clone())
            .with_timeout(config.render_timeout_secs);

        let parts = PipelineParts {
            video_provider: Box::new(video_provider),
            audio_provider,
            downloader: Box::new(HttpDownloader::new(config.http_timeout)?),
            renderer: Box::new(renderer),
            history: HistoryStore::new(&config.history_file),
            distributor,
        };

        Ok(Self::new(PipelineSettings::from(config), parts, StdRng::from_os_rng()))
    }

    /// Execute one run.
    pub async fn run(&mut self) -> WorkerResult<RunReport> {
        let logger = RunLogger::new("nature_short");
        let span = logger.create_span();
        let result = self.run_steps(&logger).instrument(span).await;
        if let Err(e) = &result {
            logger.log_error(&e.to_string());
        }
        result
    }

    async fn run_steps(&mut self, logger: &RunLogger) -> WorkerResult<RunReport> {
        logger.log_start(&format!("query '{}'", self.settings.video_query));

        let page = self.rng.random_range(1..=self.settings.max_page.max(1));
        let query = VideoQuery {
            query: self.settings.video_query.clone(),
            page,
            per_page: self.settings.per_page,
        };
        let candidates = self.video_provider.search(&query).await?;
        logger.log_step("search", &format!("{} candidates on page {}", candidates.len(), page));

        let selection = self.selector.select(&candidates, &mut self.rng).await?;
        let candidate = selection.candidate.clone();
        logger.log_step("select", &format!("selected {} ({})", candidate.id, selection.mode.as_str()));

        let workspace = self.create_workspace().await?;
        let video_path = workspace.path().join(VIDEO_FILE_NAME);
        self.downloader
            .download(&candidate.download_url, &video_path)
            .await
            .map_err(|e| WorkerError::download_failed(format!("video {}: {}", candidate.id, e)))?;
        logger.log_step("download", &format!("video {} downloaded", candidate.id));

        let (mut audio, audio_path) = self.fetch_audio(workspace.path(), logger).await;

        let rendered = self
            .renderer
            .render(&RenderRequest {
                video: video_path,
                audio: audio_path,
                output: self.settings.output_path.clone(),
            })
            .await?;
        if let Some(reason) = rendered.audio_dropped.clone() {
            audio = AudioOutcome::Failed { reason };
        }
        logger.log_step(
            "render",
            &format!(
                "{}x{} {:.2}s clip at {}",
                rendered.plan.output_width,
                rendered.plan.output_height,
                rendered.plan.duration_secs,
                rendered.path.display()
            ),
        );

        let caption = self.captions.generate(Some(&candidate.tags), &mut self.rng);
        logger.log_step("caption", &caption.title);

        let distribution = self.distributor.distribute(&rendered.path, &caption).await;
        logger.log_step(
            "distribute",
            &format!(
                "{} of {} channels delivered",
                distribution.delivered_count(),
                distribution.channels.len()
            ),
        );

        logger.log_completion(&format!("content {}", candidate.id));

        Ok(RunReport {
            run_id: logger.run_id().to_string(),
            content_id: candidate.id,
            fallback_used: selection.fallback_used(),
            output_path: rendered.path,
            plan: rendered.plan,
            caption,
            audio,
            distribution,
        })
    }

    /// Per-run scratch directory, removed on drop.
    async fn create_workspace(&self) -> WorkerResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("shorts-");
        let dir = match &self.settings.work_dir {
            Some(parent) => {
                tokio::fs::create_dir_all(parent).await?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Best-effort ambient audio. Never fails the run.
    async fn fetch_audio(&mut self, dir: &Path, logger: &RunLogger) -> (AudioOutcome, Option<PathBuf>) {
        let Some(provider) = &self.audio_provider else {
            return (
                AudioOutcome::Skipped { reason: "audio provider not configured".to_string() },
                None,
            );
        };

        let results = match provider.search(&AudioQuery::new(self.settings.audio_query.as_str())).await {
            Ok(results) => results,
            Err(e) => {
                logger.log_warning(&format!("audio search failed, continuing silent: {}", e));
                return (AudioOutcome::Failed { reason: e.to_string() }, None);
            }
        };

        let Some(choice) = results.choose(&mut self.rng).cloned() else {
            logger.log_warning("no audio results, continuing silent");
            return (AudioOutcome::Skipped { reason: "no audio results".to_string() }, None);
        };

        let path = dir.join(AUDIO_FILE_NAME);
        if let Err(e) = self.downloader.download(&choice.preview_url, &path).await {
            logger.log_warning(&format!("audio download failed, continuing silent: {}", e));
            return (AudioOutcome::Failed { reason: e.to_string() }, None);
        }

        logger.log_step("audio", &format!("audio '{}' downloaded", choice.name));
        (
            AudioOutcome::Attached { id: choice.id, name: choice.name },
            Some(path),
        )
    }
}
