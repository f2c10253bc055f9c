//! The terminal production record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::encoding::QualityTier;
use crate::window::HighlightWindow;

/// Which caption strategy, if any, produced the delivered clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionOutcome {
    /// Plain subtitle overlay succeeded
    Plain,
    /// Styled subtitle overlay succeeded after the plain attempt failed
    Styled,
    /// Captions were dropped; clip was re-encoded without them
    Uncaptioned,
    /// No transcript was available, so captioning was skipped entirely
    Skipped,
    /// All rendering strategies failed; the original clip was delivered
    Degraded,
}

impl CaptionOutcome {
    /// Whether the delivered clip actually carries burned-in captions.
    pub fn has_captions(&self) -> bool {
        matches!(self, CaptionOutcome::Plain | CaptionOutcome::Styled)
    }
}

impl fmt::Display for CaptionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaptionOutcome::Plain => "plain",
            CaptionOutcome::Styled => "styled",
            CaptionOutcome::Uncaptioned => "uncaptioned",
            CaptionOutcome::Skipped => "skipped",
            CaptionOutcome::Degraded => "degraded",
        };
        write!(f, "{}", s)
    }
}

/// A non-fatal fallback taken by one stage of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "detail")]
pub enum Degradation {
    /// Probing failed; fallback duration and dimensions were used
    ProbeFallback(String),
    /// Signal-based highlight analysis failed; uniform midpoint was used
    HighlightFallback(String),
    /// Transcription was unavailable or failed
    TranscriptUnavailable(String),
    /// Every caption rendering strategy failed
    CaptionsDropped(String),
    /// Thumbnail extraction failed entirely
    ThumbnailOmitted(String),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::ProbeFallback(d) => write!(f, "probe fallback: {}", d),
            Degradation::HighlightFallback(d) => write!(f, "highlight fallback: {}", d),
            Degradation::TranscriptUnavailable(d) => write!(f, "transcript unavailable: {}", d),
            Degradation::CaptionsDropped(d) => write!(f, "captions dropped: {}", d),
            Degradation::ThumbnailOmitted(d) => write!(f, "thumbnail omitted: {}", d),
        }
    }
}

/// Write-once aggregate describing one completed run.
///
/// Serialized as the terminal `metadata_<ts>.json` artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Source locator the run started from
    pub source: String,
    /// Selected highlight window
    pub window: HighlightWindow,
    /// Quality tier requested at acquisition
    pub quality: QualityTier,
    /// Path to the reframed (pre-caption) clip
    pub clip_path: PathBuf,
    /// Path to the delivered final clip
    pub final_path: PathBuf,
    /// Path to the thumbnail, if one was extracted
    pub thumbnail_path: Option<PathBuf>,
    /// Path to the subtitle file, if a transcript was produced
    pub subtitles_path: Option<PathBuf>,
    /// Whether a usable transcript was produced
    pub transcript_available: bool,
    /// How captioning concluded
    pub caption_outcome: CaptionOutcome,
    /// Non-fatal fallbacks taken during the run
    pub degradations: Vec<Degradation>,
    /// Run timestamp
    pub created_at: DateTime<Utc>,
}

impl ProductionRecord {
    /// Whether the run completed without any stage falling back.
    pub fn is_clean(&self) -> bool {
        self.degradations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ProductionRecord {
        ProductionRecord {
            source: "https://youtu.be/abc123def45".to_string(),
            window: HighlightWindow::new(120.0, 60.0),
            quality: QualityTier::P1080,
            clip_path: PathBuf::from("/out/clip_20260827.mp4"),
            final_path: PathBuf::from("/out/final_20260827.mp4"),
            thumbnail_path: Some(PathBuf::from("/out/thumbnail_20260827.png")),
            subtitles_path: None,
            transcript_available: false,
            caption_outcome: CaptionOutcome::Skipped,
            degradations: vec![Degradation::TranscriptUnavailable(
                "whisper not installed".to_string(),
            )],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: ProductionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, record.source);
        assert_eq!(back.caption_outcome, CaptionOutcome::Skipped);
        assert!(!back.transcript_available);
    }

    #[test]
    fn test_record_serializes_string_keys() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json.get("source").is_some());
        assert!(json.get("window").is_some());
        assert!(json.get("transcript_available").is_some());
        assert_eq!(json["quality"], "1080p");
    }

    #[test]
    fn test_caption_outcome_flags() {
        assert!(CaptionOutcome::Plain.has_captions());
        assert!(CaptionOutcome::Styled.has_captions());
        assert!(!CaptionOutcome::Degraded.has_captions());
        assert!(!CaptionOutcome::Skipped.has_captions());
    }

    #[test]
    fn test_is_clean() {
        let mut record = sample_record();
        assert!(!record.is_clean());
        record.degradations.clear();
        assert!(record.is_clean());
    }
}
