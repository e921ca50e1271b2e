//! Nature shorts binary: one pipeline run per invocation.

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shorts_worker::{Pipeline, PipelineConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,shorts=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting shorts-worker");

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    if let Err(e) = shorts_media::check_ffmpeg() {
        warn!("FFmpeg check failed: {}", e);
    }

    let mut pipeline = match Pipeline::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            metrics::counter!("shorts_runs_total", "outcome" => "failed").increment(1);
            error!("Failed to build pipeline: {}", e);
            std::process::exit(1);
        }
    };

    match pipeline.run().await {
        Ok(report) => {
            metrics::counter!("shorts_runs_total", "outcome" => "succeeded").increment(1);
            info!(
                run_id = %report.run_id,
                content_id = %report.content_id,
                fallback_used = report.fallback_used,
                audio_attached = report.audio.is_attached(),
                public_url = ?report.distribution.public_url,
                "Success! Clip written to {}",
                report.output_path.display()
            );
        }
        Err(e) => {
            metrics::counter!("shorts_runs_total", "outcome" => "failed").increment(1);
            error!(kind = e.kind(), "Run failed: {}", e);
            std::process::exit(1);
        }
    }
}
