//! Pipeline configuration and capability flags.

use std::path::PathBuf;

use clipsmith_media::{check_ffmpeg, check_whisper};
use clipsmith_models::{EncodingConfig, QualityTier};

/// Default clip length in seconds.
pub const DEFAULT_TARGET_DURATION_SECS: f64 = 60.0;
/// Default thumbnail timestamp within the final clip.
pub const DEFAULT_THUMBNAIL_TIMESTAMP_SECS: f64 = 10.0;

/// Which optional collaborators are present.
///
/// Built once at construction and passed into the orchestrator; absence of a
/// capability degrades the corresponding stage instead of failing the run.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// A transcription engine is installed
    pub transcription: bool,
    /// Content analysis (audio decoding for highlight scoring) is available
    pub content_analysis: bool,
}

impl Capabilities {
    /// Probe PATH for the optional collaborators.
    pub fn detect() -> Self {
        Self {
            transcription: check_whisper().is_ok(),
            content_analysis: check_ffmpeg().is_ok(),
        }
    }

    pub fn full() -> Self {
        Self {
            transcription: true,
            content_analysis: true,
        }
    }

    pub fn none() -> Self {
        Self {
            transcription: false,
            content_analysis: false,
        }
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source locator (URL)
    pub source: String,
    /// Requested highlight window length in seconds
    pub target_duration_secs: f64,
    /// Source quality tier for acquisition
    pub quality: QualityTier,
    /// Directory receiving final artifacts
    pub output_dir: PathBuf,
    /// Highlight strategy name
    pub strategy: String,
    /// Caption language hint
    pub language: String,
    /// Encoding profile for every re-encode
    pub encoding: EncodingConfig,
    /// Timestamp for thumbnail extraction within the final clip
    pub thumbnail_timestamp_secs: f64,
    /// Optional timeout applied to each external encode
    pub tool_timeout_secs: Option<u64>,
}

impl PipelineConfig {
    pub fn new(source: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target_duration_secs: DEFAULT_TARGET_DURATION_SECS,
            quality: QualityTier::default(),
            output_dir: output_dir.into(),
            strategy: "uniform-midpoint".to_string(),
            language: "en".to_string(),
            encoding: EncodingConfig::default(),
            thumbnail_timestamp_secs: DEFAULT_THUMBNAIL_TIMESTAMP_SECS,
            tool_timeout_secs: None,
        }
    }
}
