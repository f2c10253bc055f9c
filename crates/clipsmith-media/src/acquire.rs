//! Source acquisition using yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use clipsmith_models::QualityTier;

/// Filename stem for the downloaded source inside the work directory.
const DOWNLOAD_STEM: &str = "original";

/// Fetches a remote source to a local media file.
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(
        &self,
        locator: &str,
        quality: QualityTier,
        dest_dir: &Path,
    ) -> MediaResult<PathBuf>;
}

/// Production acquirer spawning the `yt-dlp` binary.
#[derive(Debug, Clone, Default)]
pub struct YtDlpAcquirer;

impl YtDlpAcquirer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Acquirer for YtDlpAcquirer {
    async fn acquire(
        &self,
        locator: &str,
        quality: QualityTier,
        dest_dir: &Path,
    ) -> MediaResult<PathBuf> {
        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        tokio::fs::create_dir_all(dest_dir).await?;

        let max_height = quality.max_height();
        let format = format!(
            "bestvideo[height<={h}]+bestaudio/best[height<={h}]",
            h = max_height
        );
        let output_template = dest_dir.join(format!("{}.%(ext)s", DOWNLOAD_STEM));
        let output_template_str = output_template.to_string_lossy();

        info!(locator = %locator, quality = %quality, "Downloading source video");

        let output = Command::new("yt-dlp")
            .args([
                "-f",
                &format,
                "--merge-output-format",
                "mp4",
                "-o",
                &output_template_str,
                locator,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
        }

        let path = find_downloaded_file(dest_dir).await?;
        let size = path.metadata()?.len();
        info!(
            path = %path.display(),
            size_mb = size as f64 / (1024.0 * 1024.0),
            "Downloaded source video"
        );

        Ok(path)
    }
}

/// Locate the downloaded `original.*` file, preferring known containers.
async fn find_downloaded_file(dest_dir: &Path) -> MediaResult<PathBuf> {
    for ext in ["mp4", "mkv", "webm"] {
        let candidate = dest_dir.join(format!("{}.{}", DOWNLOAD_STEM, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Merge can leave an unexpected extension; take anything with the stem.
    let mut entries = tokio::fs::read_dir(dest_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if name
            .to_string_lossy()
            .starts_with(&format!("{}.", DOWNLOAD_STEM))
        {
            return Ok(entry.path());
        }
    }

    Err(MediaError::FileNotFound(
        dest_dir.join(format!("{}.*", DOWNLOAD_STEM)),
    ))
}
