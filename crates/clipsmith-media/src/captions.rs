//! Caption burning with an ordered fallback chain.
//!
//! Subtitle rendering backends are fragile (missing fonts, libass quirks,
//! path escaping), so captioning is best-effort: an ordered list of complete
//! re-encode strategies is tried until one succeeds, ending with a no-caption
//! re-encode. If every strategy fails the original clip is delivered
//! untouched; this stage never fails outward.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, ToolRunner};
use crate::error::{MediaError, MediaResult};
use clipsmith_models::{CaptionOutcome, Degradation, EncodingConfig, Transcript};

/// libass style applied by the styled overlay attempt.
pub const CAPTION_FORCE_STYLE: &str = "Fontname=Arial,Fontsize=24,\
PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,BackColour=&H80000000,\
BorderStyle=3,Outline=1,Shadow=1,MarginV=20";

/// The clip delivered by the captioning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionedClip {
    pub path: PathBuf,
    pub outcome: CaptionOutcome,
}

/// One entry of the fallback chain.
struct CaptionAttempt {
    outcome: CaptionOutcome,
    label: &'static str,
    filter: Option<String>,
}

/// The ordered chain: plain overlay, styled overlay, drop captions.
fn caption_chain(srt_path: &Path) -> Vec<CaptionAttempt> {
    let escaped = escape_filter_path(srt_path);
    vec![
        CaptionAttempt {
            outcome: CaptionOutcome::Plain,
            label: "plain-overlay",
            filter: Some(format!("subtitles={}", escaped)),
        },
        CaptionAttempt {
            outcome: CaptionOutcome::Styled,
            label: "styled-overlay",
            filter: Some(format!(
                "subtitles={}:force_style='{}'",
                escaped, CAPTION_FORCE_STYLE
            )),
        },
        CaptionAttempt {
            outcome: CaptionOutcome::Uncaptioned,
            label: "drop-captions",
            filter: None,
        },
    ]
}

/// Escape a path for use inside an FFmpeg filter expression.
///
/// The `subtitles=` filter parses `\` and `:` specially.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', r"\\")
        .replace(':', r"\:")
}

/// Burn captions into `clip`, writing the result to `output`.
///
/// With no transcript the input is returned unchanged (skipped, not failed)
/// and no re-encode is performed. With a transcript the fallback chain runs;
/// exhaustion returns the untouched input clip and a degradation note.
pub async fn burn_captions(
    runner: &dyn ToolRunner,
    clip: &Path,
    transcript: Option<&Transcript>,
    encoding: &EncodingConfig,
    output: &Path,
) -> (CaptionedClip, Option<Degradation>) {
    let Some(transcript) = transcript else {
        debug!("No transcript available, captioning skipped");
        return (
            CaptionedClip {
                path: clip.to_path_buf(),
                outcome: CaptionOutcome::Skipped,
            },
            None,
        );
    };

    match run_caption_chain(runner, clip, transcript, encoding, output).await {
        Ok(captioned) => (captioned, None),
        Err(e) => {
            warn!(
                error = %e,
                "All caption strategies failed, delivering clip uncaptioned"
            );
            (
                CaptionedClip {
                    path: clip.to_path_buf(),
                    outcome: CaptionOutcome::Degraded,
                },
                Some(Degradation::CaptionsDropped(e.to_string())),
            )
        }
    }
}

async fn run_caption_chain(
    runner: &dyn ToolRunner,
    clip: &Path,
    transcript: &Transcript,
    encoding: &EncodingConfig,
    output: &Path,
) -> MediaResult<CaptionedClip> {
    // Scoped caption source: the temp file is removed when this function
    // returns, success or failure, via NamedTempFile's drop.
    let srt_file = tempfile::Builder::new()
        .prefix("captions-")
        .suffix(".srt")
        .tempfile()?;
    tokio::fs::write(srt_file.path(), transcript.to_srt()).await?;

    let mut last_error: Option<MediaError> = None;

    for (index, attempt) in caption_chain(srt_file.path()).into_iter().enumerate() {
        // Fresh output location per attempt; a failed partial write cannot
        // corrupt an earlier artifact.
        let attempt_path = attempt_output_path(output, index);

        let mut cmd =
            FfmpegCommand::new(clip, &attempt_path).output_args(encoding.to_output_args());
        if let Some(filter) = &attempt.filter {
            cmd = cmd.video_filter(filter);
        }

        match runner.run_ffmpeg(&cmd).await {
            Ok(()) => match tokio::fs::rename(&attempt_path, output).await {
                Ok(()) => {
                    info!(strategy = attempt.label, "Caption strategy succeeded");
                    return Ok(CaptionedClip {
                        path: output.to_path_buf(),
                        outcome: attempt.outcome,
                    });
                }
                Err(e) => {
                    warn!(
                        strategy = attempt.label,
                        error = %e,
                        "Failed to move caption attempt into place"
                    );
                    let _ = tokio::fs::remove_file(&attempt_path).await;
                    last_error = Some(MediaError::from(e));
                }
            },
            Err(e) => {
                warn!(
                    strategy = attempt.label,
                    error = %e,
                    "Caption strategy failed, trying next"
                );
                let _ = tokio::fs::remove_file(&attempt_path).await;
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| MediaError::ffmpeg_failed("caption chain was empty", None, None)))
}

fn attempt_output_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "captioned".to_string());
    let ext = output
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    output.with_file_name(format!("{}.attempt{}.{}", stem, index, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Runner that follows a script of per-call results and creates the
    /// output file on success, like a real encode would.
    struct ScriptedRunner {
        script: Mutex<Vec<Result<(), String>>>,
        filters: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedRunner {
        fn new(script: Vec<Result<(), String>>) -> Self {
            Self {
                script: Mutex::new(script),
                filters: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.filters.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ToolRunner for ScriptedRunner {
        async fn run_ffmpeg(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
            let args = cmd.build_args();
            let filter = args
                .iter()
                .position(|a| a == "-vf")
                .map(|i| args[i + 1].clone());
            self.filters.lock().unwrap().push(filter);

            let next = {
                let mut script = self.script.lock().unwrap();
                if script.is_empty() {
                    Ok(())
                } else {
                    script.remove(0)
                }
            };

            match next {
                Ok(()) => {
                    tokio::fs::write(cmd.output(), b"video").await.unwrap();
                    Ok(())
                }
                Err(msg) => Err(MediaError::ffmpeg_failed(msg, None, Some(1))),
            }
        }
    }

    fn transcript() -> Transcript {
        Transcript::from_timed_text(vec![(0.0, 2.0, "hello"), (2.0, 4.0, "world")]).unwrap()
    }

    async fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.mp4");
        tokio::fs::write(&clip, b"encoded clip").await.unwrap();
        let output = dir.path().join("final.mp4");
        (dir, clip, output)
    }

    #[tokio::test]
    async fn test_no_transcript_skips_without_encoding() {
        let (_dir, clip, output) = fixture().await;
        let runner = ScriptedRunner::new(vec![]);

        let (captioned, degradation) =
            burn_captions(&runner, &clip, None, &EncodingConfig::default(), &output).await;

        assert_eq!(captioned.path, clip);
        assert_eq!(captioned.outcome, CaptionOutcome::Skipped);
        assert!(degradation.is_none());
        assert_eq!(runner.calls(), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_plain_overlay_succeeds_first() {
        let (_dir, clip, output) = fixture().await;
        let runner = ScriptedRunner::new(vec![Ok(())]);
        let t = transcript();

        let (captioned, degradation) = burn_captions(
            &runner,
            &clip,
            Some(&t),
            &EncodingConfig::default(),
            &output,
        )
        .await;

        assert_eq!(captioned.outcome, CaptionOutcome::Plain);
        assert_eq!(captioned.path, output);
        assert!(output.exists());
        assert!(degradation.is_none());
        assert_eq!(runner.calls(), 1);

        let filters = runner.filters.lock().unwrap();
        assert!(filters[0].as_ref().unwrap().starts_with("subtitles="));
        assert!(!filters[0].as_ref().unwrap().contains("force_style"));
    }

    #[tokio::test]
    async fn test_styled_overlay_after_plain_fails() {
        let (_dir, clip, output) = fixture().await;
        let runner = ScriptedRunner::new(vec![Err("libass failed".into()), Ok(())]);
        let t = transcript();

        let (captioned, degradation) = burn_captions(
            &runner,
            &clip,
            Some(&t),
            &EncodingConfig::default(),
            &output,
        )
        .await;

        assert_eq!(captioned.outcome, CaptionOutcome::Styled);
        assert!(degradation.is_none());
        assert_eq!(runner.calls(), 2);

        let filters = runner.filters.lock().unwrap();
        assert!(filters[1].as_ref().unwrap().contains("force_style"));
    }

    #[tokio::test]
    async fn test_drop_captions_as_last_resort() {
        let (_dir, clip, output) = fixture().await;
        let runner = ScriptedRunner::new(vec![
            Err("fail 1".into()),
            Err("fail 2".into()),
            Ok(()),
        ]);
        let t = transcript();

        let (captioned, degradation) = burn_captions(
            &runner,
            &clip,
            Some(&t),
            &EncodingConfig::default(),
            &output,
        )
        .await;

        assert_eq!(captioned.outcome, CaptionOutcome::Uncaptioned);
        assert_eq!(captioned.path, output);
        assert!(degradation.is_none());

        let filters = runner.filters.lock().unwrap();
        assert!(filters[2].is_none());
    }

    #[tokio::test]
    async fn test_all_strategies_fail_delivers_original() {
        let (_dir, clip, output) = fixture().await;
        let runner = ScriptedRunner::new(vec![
            Err("fail 1".into()),
            Err("fail 2".into()),
            Err("fail 3".into()),
        ]);
        let t = transcript();

        let (captioned, degradation) = burn_captions(
            &runner,
            &clip,
            Some(&t),
            &EncodingConfig::default(),
            &output,
        )
        .await;

        assert_eq!(captioned.path, clip);
        assert_eq!(captioned.outcome, CaptionOutcome::Degraded);
        assert!(matches!(degradation, Some(Degradation::CaptionsDropped(_))));
        assert_eq!(runner.calls(), 3);
        assert!(!output.exists());
        // Original clip untouched
        assert_eq!(tokio::fs::read(&clip).await.unwrap(), b"encoded clip");
    }

    #[test]
    fn test_escape_filter_path() {
        let escaped = escape_filter_path(Path::new("/tmp/a:b.srt"));
        assert_eq!(escaped, r"/tmp/a\:b.srt");
    }

    #[test]
    fn test_chain_order() {
        let chain = caption_chain(Path::new("/tmp/c.srt"));
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].outcome, CaptionOutcome::Plain);
        assert_eq!(chain[1].outcome, CaptionOutcome::Styled);
        assert_eq!(chain[2].outcome, CaptionOutcome::Uncaptioned);
        assert!(chain[2].filter.is_none());
    }
}
