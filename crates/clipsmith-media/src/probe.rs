//! FFprobe duration and dimension probing.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

use crate::error::{MediaError, MediaResult};
use clipsmith_models::MediaInfo;

/// Duration assumed when probing fails.
pub const FALLBACK_DURATION_SECS: f64 = 300.0;
/// Dimensions assumed when probing fails (landscape 1080p).
pub const FALLBACK_WIDTH: u32 = 1920;
pub const FALLBACK_HEIGHT: u32 = 1080;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a media file for duration and dimensions.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::InvalidVideo("No parseable duration".to_string()))?;

    Ok(MediaInfo {
        duration_secs: duration,
        width: video_stream.width.unwrap_or(FALLBACK_WIDTH),
        height: video_stream.height.unwrap_or(FALLBACK_HEIGHT),
    })
}

/// Probe a media file, falling back to fixed values on any failure.
///
/// Never fails outward; every caller always receives a usable duration and
/// dimensions. Returns the info plus the probe error, if any, so callers can
/// record the degradation.
pub async fn probe_or_default(path: impl AsRef<Path>) -> (MediaInfo, Option<MediaError>) {
    let path = path.as_ref();
    match probe_media(path).await {
        Ok(info) => (info, None),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Probe failed, using fallback duration and dimensions"
            );
            (
                MediaInfo {
                    duration_secs: FALLBACK_DURATION_SECS,
                    width: FALLBACK_WIDTH,
                    height: FALLBACK_HEIGHT,
                },
                Some(e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_missing_file_errors() {
        let err = probe_media("/nonexistent/video.mp4").await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_probe_or_default_never_fails() {
        let (info, err) = probe_or_default("/nonexistent/video.mp4").await;
        assert!(err.is_some());
        assert_eq!(info.duration_secs, FALLBACK_DURATION_SECS);
        assert_eq!(info.width, FALLBACK_WIDTH);
        assert_eq!(info.height, FALLBACK_HEIGHT);
    }

    #[test]
    fn test_ffprobe_output_parsing() {
        let json = r#"{
            "format": {"duration": "300.5"},
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 1280, "height": 720}
            ]
        }"#;
        let parsed: FfprobeOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.format.duration.as_deref(), Some("300.5"));
        let video = parsed
            .streams
            .iter()
            .find(|s| s.codec_type == "video")
            .unwrap();
        assert_eq!(video.width, Some(1280));
        assert_eq!(video.height, Some(720));
    }
}
