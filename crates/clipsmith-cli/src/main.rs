//! Clipsmith command-line entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipsmith_media::{check_ffmpeg, check_ffprobe, check_ytdlp};
use clipsmith_models::QualityTier;
use clipsmith_pipeline::{Orchestrator, PipelineConfig};

/// Produce a vertical short-form clip from a remote video.
#[derive(Debug, Parser)]
#[command(name = "clipsmith", version, about)]
struct Cli {
    /// Source video URL
    #[arg(long)]
    url: String,

    /// Clip length in seconds
    #[arg(long, default_value_t = 60.0)]
    duration: f64,

    /// Source quality tier (720p, 1080p, 4k)
    #[arg(long, default_value = "1080p")]
    quality: String,

    /// Directory receiving the final artifacts
    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,

    /// Highlight selection strategy (uniform-midpoint, audio-energy)
    #[arg(long, default_value = "uniform-midpoint")]
    highlight_strategy: String,

    /// Caption language hint
    #[arg(long, default_value = "en")]
    language: String,

    /// Per-encode timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing with colored output for dev, JSON for production.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clipsmith=info,warn"));

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
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Required tools up front; transcription and analysis are optional and
    // detected by the orchestrator itself.
    check_ffmpeg().context("ffmpeg is required")?;
    check_ffprobe().context("ffprobe is required")?;
    check_ytdlp().context("yt-dlp is required")?;

    let quality: QualityTier = cli
        .quality
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let mut config = PipelineConfig::new(cli.url, cli.output_dir);
    config.target_duration_secs = cli.duration;
    config.quality = quality;
    config.strategy = cli.highlight_strategy;
    config.language = cli.language;
    config.tool_timeout_secs = cli.timeout;

    info!(
        source = %config.source,
        duration = config.target_duration_secs,
        quality = %config.quality,
        strategy = %config.strategy,
        "Starting clipsmith"
    );

    let record = Orchestrator::new(config).run().await?;

    info!(final_path = %record.final_path.display(), "Clip ready");
    if let Some(thumb) = &record.thumbnail_path {
        info!(thumbnail = %thumb.display(), "Thumbnail ready");
    }
    if !record.is_clean() {
        for degradation in &record.degradations {
            info!(note = %degradation, "Run degraded");
        }
    }

    Ok(())
}
