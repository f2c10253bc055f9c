//! Vertical reframing of a highlight window.
//!
//! Scale so the limiting target dimension is matched, then center-crop the
//! other axis. The frame is always filled; no letterboxing.

use std::path::Path;

use tracing::info;

use crate::command::{FfmpegCommand, ToolRunner};
use crate::error::MediaResult;
use clipsmith_models::{EncodingConfig, HighlightWindow, SourceMedia, TARGET_HEIGHT, TARGET_WIDTH};

/// Build the scale-then-center-crop filter for the given source dimensions.
///
/// A source wider than the target aspect is scaled to the target height and
/// cropped horizontally; a taller source is scaled to the target width and
/// cropped vertically. `crop` without offsets is centered.
pub fn scale_crop_filter(src_width: u32, src_height: u32) -> String {
    let src_aspect = src_width as f64 / src_height.max(1) as f64;
    let target_aspect = TARGET_WIDTH as f64 / TARGET_HEIGHT as f64;

    if src_aspect >= target_aspect {
        format!(
            "scale=-2:{h},crop={w}:{h}",
            w = TARGET_WIDTH,
            h = TARGET_HEIGHT
        )
    } else {
        format!(
            "scale={w}:-2,crop={w}:{h}",
            w = TARGET_WIDTH,
            h = TARGET_HEIGHT
        )
    }
}

/// Encode the highlight window as a vertical clip.
///
/// The one stage whose failure is fatal: without an encoded clip nothing
/// downstream can proceed, so the error propagates to the caller.
pub async fn render_vertical_clip(
    runner: &dyn ToolRunner,
    source: &SourceMedia,
    window: HighlightWindow,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let output = output.as_ref();
    let filter = scale_crop_filter(source.width, source.height);

    info!(
        input = %source.path.display(),
        output = %output.display(),
        start = window.start_secs,
        duration = window.duration_secs,
        filter = %filter,
        "Rendering vertical clip"
    );

    let cmd = FfmpegCommand::new(&source.path, output)
        .seek(window.start_secs)
        .duration(window.duration_secs)
        .video_filter(filter)
        .output_args(encoding.to_output_args());

    runner.run_ffmpeg(&cmd).await
}
