//! Transcript generation using the whisper CLI.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use clipsmith_models::Transcript;

/// Default whisper model size.
const DEFAULT_MODEL: &str = "small";

/// Produces a timed transcript from a media file.
///
/// Entirely optional: the pipeline treats absence of the capability or any
/// failure here as "transcript unavailable", never as a fatal error.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        media: &Path,
        language: &str,
        work_dir: &Path,
    ) -> MediaResult<Transcript>;
}

/// Production transcriber spawning the `whisper` binary.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    model: String,
}

impl Default for WhisperTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl WhisperTranscriber {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        media: &Path,
        language: &str,
        work_dir: &Path,
    ) -> MediaResult<Transcript> {
        which::which("whisper").map_err(|_| MediaError::WhisperNotFound)?;

        tokio::fs::create_dir_all(work_dir).await?;

        info!(
            media = %media.display(),
            model = %self.model,
            language = language,
            "Transcribing clip"
        );

        let output = Command::new("whisper")
            .arg(media)
            .args(["--model", &self.model])
            .args(["--language", language])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("whisper stderr: {}", stderr);
            return Err(MediaError::transcription_failed(format!(
                "whisper failed: {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
        }

        let stem = media
            .file_stem()
            .ok_or_else(|| MediaError::transcription_failed("media path has no file stem"))?;
        let json_path = work_dir.join(stem).with_extension("json");

        let content = tokio::fs::read_to_string(&json_path)
            .await
            .map_err(|_| MediaError::FileNotFound(json_path.clone()))?;

        let transcript = parse_whisper_json(&content)?;

        info!(segments = transcript.len(), "Transcription complete");
        Ok(transcript)
    }
}

/// Whisper JSON output format.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Parse and validate whisper's JSON output.
///
/// Timing violations (empty segments, decreasing starts) are reported as a
/// transcription failure so the caller discards the transcript.
fn parse_whisper_json(content: &str) -> MediaResult<Transcript> {
    let parsed: WhisperOutput = serde_json::from_str(content)?;

    let transcript = Transcript::from_timed_text(
        parsed
            .segments
            .into_iter()
            .map(|s| (s.start, s.end, s.text.trim().to_string())),
    )?;

    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsmith_models::TranscriptError;

    #[test]
    fn test_parse_whisper_output() {
        let json = r#"{
            "text": "hello world",
            "segments": [
                {"id": 0, "start": 0.0, "end": 2.0, "text": " hello"},
                {"id": 1, "start": 2.0, "end": 4.5, "text": " world"}
            ],
            "language": "en"
        }"#;
        let transcript = parse_whisper_json(json).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.segments[0].text, "hello");
        assert_eq!(transcript.segments[1].start_secs, 2.0);
    }

    #[test]
    fn test_non_monotonic_segments_rejected() {
        let json = r#"{
            "segments": [
                {"start": 5.0, "end": 7.0, "text": "a"},
                {"start": 2.0, "end": 4.0, "text": "b"}
            ]
        }"#;
        let err = parse_whisper_json(json).unwrap_err();
        assert!(matches!(
            err,
            MediaError::InvalidTranscript(TranscriptError::NonMonotonic { .. })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            parse_whisper_json("not json").unwrap_err(),
            MediaError::JsonParse(_)
        ));
    }
}
