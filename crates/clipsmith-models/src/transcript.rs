//! Timed transcripts and SRT rendering.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

/// Transcript validation failures.
///
/// These are treated as a transcription failure by callers, never a crash:
/// a transcript that fails validation is simply discarded.
#[derive(Debug, Error, PartialEq)]
pub enum TranscriptError {
    #[error("segment {index} has start {start} >= end {end}")]
    EmptySegment { index: usize, start: f64, end: f64 },

    #[error("segment {index} starts at {start}, before previous start {previous}")]
    NonMonotonic {
        index: usize,
        start: f64,
        previous: f64,
    },

    #[error("transcript contains no segments")]
    NoSegments,
}

/// One timed caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// An ordered sequence of timed segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Build a transcript from (start, end, text) tuples, assigning indices
    /// and validating timing.
    pub fn from_timed_text<I, S>(entries: I) -> Result<Self, TranscriptError>
    where
        I: IntoIterator<Item = (f64, f64, S)>,
        S: Into<String>,
    {
        let segments: Vec<TranscriptSegment> = entries
            .into_iter()
            .enumerate()
            .map(|(index, (start_secs, end_secs, text))| TranscriptSegment {
                index,
                start_secs,
                end_secs,
                text: text.into(),
            })
            .collect();

        let transcript = Self { segments };
        transcript.validate()?;
        Ok(transcript)
    }

    /// Validate per-segment `start < end` and non-decreasing `start` across
    /// the sequence.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        if self.segments.is_empty() {
            return Err(TranscriptError::NoSegments);
        }

        let mut previous_start = f64::NEG_INFINITY;
        for segment in &self.segments {
            if segment.start_secs >= segment.end_secs {
                return Err(TranscriptError::EmptySegment {
                    index: segment.index,
                    start: segment.start_secs,
                    end: segment.end_secs,
                });
            }
            if segment.start_secs < previous_start {
                return Err(TranscriptError::NonMonotonic {
                    index: segment.index,
                    start: segment.start_secs,
                    previous: previous_start,
                });
            }
            previous_start = segment.start_secs;
        }

        Ok(())
    }

    /// Render as SRT subtitle text.
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let _ = write!(
                out,
                "{}\n{} --> {}\n{}\n\n",
                segment.index + 1,
                format_srt_timestamp(segment.start_secs),
                format_srt_timestamp(segment.end_secs),
                segment.text.trim()
            );
        }
        out
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Format seconds as an SRT timestamp: `HH:MM:SS,mmm`.
fn format_srt_timestamp(secs: f64) -> String {
    let total_millis = (secs * 1000.0).round().max(0.0) as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transcript() {
        let t = Transcript::from_timed_text(vec![
            (0.0, 2.5, "hello"),
            (2.5, 4.0, "world"),
            (4.0, 6.0, "again"),
        ])
        .unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.segments[1].index, 1);
    }

    #[test]
    fn test_rejects_empty_segment() {
        let err = Transcript::from_timed_text(vec![(0.0, 2.0, "a"), (3.0, 3.0, "b")]).unwrap_err();
        assert!(matches!(err, TranscriptError::EmptySegment { index: 1, .. }));
    }

    #[test]
    fn test_rejects_non_monotonic_start() {
        let err = Transcript::from_timed_text(vec![(5.0, 7.0, "a"), (2.0, 4.0, "b")]).unwrap_err();
        assert!(matches!(err, TranscriptError::NonMonotonic { index: 1, .. }));
    }

    #[test]
    fn test_rejects_empty_transcript() {
        let err = Transcript::from_timed_text(Vec::<(f64, f64, String)>::new()).unwrap_err();
        assert_eq!(err, TranscriptError::NoSegments);
    }

    #[test]
    fn test_srt_rendering() {
        let t = Transcript::from_timed_text(vec![(0.0, 1.5, " hello "), (61.25, 62.0, "world")])
            .unwrap();
        let srt = t.to_srt();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,500\nhello\n"));
        assert!(srt.contains("2\n00:01:01,250 --> 00:01:02,000\nworld\n"));
    }

    #[test]
    fn test_srt_timestamp_format() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(3661.042), "01:01:01,042");
    }
}
