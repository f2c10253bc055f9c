//! Probed source media.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Basic stream information returned by probing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration_secs: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// A local media file with its probed properties.
///
/// Immutable once constructed; every downstream stage reads from it and
/// produces new artifacts rather than mutating the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMedia {
    /// Path to the local media file
    pub path: PathBuf,
    /// Total duration in seconds
    pub duration_secs: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl SourceMedia {
    /// Construct from a path and probed info.
    pub fn new(path: impl AsRef<Path>, info: MediaInfo) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            duration_secs: info.duration_secs,
            width: info.width,
            height: info.height,
        }
    }

    pub fn info(&self) -> MediaInfo {
        MediaInfo {
            duration_secs: self.duration_secs,
            width: self.width,
            height: self.height,
        }
    }
}
