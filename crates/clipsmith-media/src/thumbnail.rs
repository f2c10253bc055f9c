//! Thumbnail extraction with first-frame fallback.

use std::path::Path;

use tracing::{info, warn};

use crate::command::{FfmpegCommand, ToolRunner};
use crate::error::{MediaError, MediaResult};
use clipsmith_models::{TARGET_HEIGHT, TARGET_WIDTH};

/// Reframe filter matching the clip geometry: fill the target frame, then
/// center-crop. `force_original_aspect_ratio=increase` handles both
/// orientations in one expression.
fn thumbnail_filter() -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
        w = TARGET_WIDTH,
        h = TARGET_HEIGHT
    )
}

/// Extract a reframed still frame from `video` at `timestamp_secs`.
///
/// Primary: seek to the timestamp and take one frame. Fallback: take the
/// first decodable frame regardless of timestamp (covers seeks beyond the
/// clip's end). Both failing is reported as an error the caller records as
/// a degradation; it is never fatal to a run.
pub async fn extract_thumbnail(
    runner: &dyn ToolRunner,
    video: &Path,
    timestamp_secs: f64,
    output: &Path,
) -> MediaResult<()> {
    let primary = FfmpegCommand::new(video, output)
        .seek(timestamp_secs)
        .single_frame()
        .video_filter(thumbnail_filter());

    match run_frame_grab(runner, &primary, output).await {
        Ok(()) => {
            info!(
                timestamp = timestamp_secs,
                output = %output.display(),
                "Thumbnail extracted"
            );
            return Ok(());
        }
        Err(e) => {
            warn!(
                timestamp = timestamp_secs,
                error = %e,
                "Thumbnail seek failed, falling back to first frame"
            );
        }
    }

    let fallback = FfmpegCommand::new(video, output)
        .single_frame()
        .video_filter(format!("select=eq(n\\,0),{}", thumbnail_filter()));

    run_frame_grab(runner, &fallback, output).await?;
    info!(output = %output.display(), "Thumbnail extracted from first frame");
    Ok(())
}

/// Run a single-frame grab and verify a frame was actually written.
///
/// A seek past the end of the stream can exit zero without producing any
/// output, so success requires the file to exist.
async fn run_frame_grab(
    runner: &dyn ToolRunner,
    cmd: &FfmpegCommand,
    output: &Path,
) -> MediaResult<()> {
    runner.run_ffmpeg(cmd).await?;
    if !output.exists() {
        return Err(MediaError::FileNotFound(output.to_path_buf()));
    }
    Ok(())
}
