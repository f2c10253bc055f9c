//! Highlight window selection strategies.
//!
//! Every strategy shares one contract: given the probed source and the
//! requested window length, return a start offset. Signal-based strategies
//! may fail internally; the selector falls back to the uniform midpoint, so
//! selection itself never fails outward.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, ToolRunner};
use crate::error::{MediaError, MediaResult};
use clipsmith_models::{HighlightWindow, SourceMedia};

/// Audio sample rate used for energy analysis.
const ANALYSIS_SAMPLE_RATE: u32 = 16_000;
/// Bytes per second of mono s16le at the analysis sample rate.
const BYTES_PER_SECOND: usize = (ANALYSIS_SAMPLE_RATE as usize) * 2;

/// The deterministic default offset: center the window in the source.
pub fn uniform_midpoint_offset(total_secs: f64, window_secs: f64) -> f64 {
    ((total_secs - window_secs) / 2.0).max(0.0)
}

/// A pluggable offset-picking strategy.
#[async_trait]
pub trait HighlightStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return the chosen start offset in seconds.
    async fn analyze(&self, source: &SourceMedia, window_secs: f64) -> MediaResult<f64>;
}

/// Deterministic midpoint strategy; cannot fail.
#[derive(Debug, Clone, Default)]
pub struct UniformMidpoint;

#[async_trait]
impl HighlightStrategy for UniformMidpoint {
    fn name(&self) -> &'static str {
        "uniform-midpoint"
    }

    async fn analyze(&self, source: &SourceMedia, window_secs: f64) -> MediaResult<f64> {
        Ok(uniform_midpoint_offset(source.duration_secs, window_secs))
    }
}

/// Audio-energy strategy: decode the audio track to mono PCM, score each
/// second by RMS energy, and pick the loudest contiguous window.
pub struct AudioEnergy {
    runner: Arc<dyn ToolRunner>,
}

impl AudioEnergy {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl HighlightStrategy for AudioEnergy {
    fn name(&self) -> &'static str {
        "audio"
    }

    async fn analyze(&self, source: &SourceMedia, window_secs: f64) -> MediaResult<f64> {
        let temp_dir = tempfile::tempdir()?;
        let pcm_path = temp_dir.path().join("audio.pcm");

        let cmd = FfmpegCommand::new(&source.path, &pcm_path)
            .no_video()
            .output_args(["-acodec", "pcm_s16le"])
            .output_args(["-ar", &ANALYSIS_SAMPLE_RATE.to_string()])
            .output_args(["-ac", "1"])
            .format("s16le");

        self.runner.run_ffmpeg(&cmd).await?;

        let bytes = tokio::fs::read(&pcm_path).await?;
        if bytes.is_empty() {
            return Err(MediaError::analysis_failed("decoded audio track is empty"));
        }

        let energy = per_second_energy(&bytes);
        let window_len = (window_secs.ceil() as usize).max(1);
        let best_start = best_window_start(&energy, window_len);

        debug!(
            seconds_analyzed = energy.len(),
            best_start, "Audio energy analysis complete"
        );

        Ok(best_start as f64)
    }
}

/// Face-activity strategy. Face detection requires an analysis capability
/// this build does not ship; analyze always reports that as a failure and
/// the selector falls back to the midpoint.
#[derive(Debug, Clone, Default)]
pub struct FaceActivity;

#[async_trait]
impl HighlightStrategy for FaceActivity {
    fn name(&self) -> &'static str {
        "face"
    }

    async fn analyze(&self, _source: &SourceMedia, _window_secs: f64) -> MediaResult<f64> {
        Err(MediaError::analysis_failed(
            "face detection capability not present",
        ))
    }
}

/// Resolve a strategy by CLI name. Unknown names resolve to the midpoint.
pub fn strategy_for(name: &str, runner: Arc<dyn ToolRunner>) -> Box<dyn HighlightStrategy> {
    match name {
        "uniform-midpoint" | "midpoint" => Box::new(UniformMidpoint),
        "audio" => Box::new(AudioEnergy::new(runner)),
        "face" => Box::new(FaceActivity),
        other => {
            warn!(
                strategy = other,
                "Unknown highlight strategy, using uniform-midpoint"
            );
            Box::new(UniformMidpoint)
        }
    }
}

/// Result of highlight selection, with the fallback reason if the strategy
/// failed internally.
#[derive(Debug, Clone)]
pub struct SelectedHighlight {
    pub window: HighlightWindow,
    pub strategy: &'static str,
    pub fallback: Option<String>,
}

/// Pick a highlight window. Never fails outward: any strategy error falls
/// back to the uniform midpoint, and the window is clamped to the source.
pub async fn select_highlight(
    source: &SourceMedia,
    requested_secs: f64,
    strategy: &dyn HighlightStrategy,
) -> SelectedHighlight {
    let (offset, fallback) = match strategy.analyze(source, requested_secs).await {
        Ok(offset) => (offset, None),
        Err(e) => {
            warn!(
                strategy = strategy.name(),
                error = %e,
                "Highlight analysis failed, falling back to uniform midpoint"
            );
            (
                uniform_midpoint_offset(source.duration_secs, requested_secs),
                Some(e.to_string()),
            )
        }
    };

    let window = HighlightWindow::new(offset, requested_secs).clamp_to(source.duration_secs);

    info!(
        strategy = strategy.name(),
        start = window.start_secs,
        duration = window.duration_secs,
        "Selected highlight window"
    );

    SelectedHighlight {
        window,
        strategy: strategy.name(),
        fallback,
    }
}

/// RMS energy per second of mono s16le PCM.
fn per_second_energy(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks(BYTES_PER_SECOND)
        .map(|second| {
            let sum_sq: f64 = second
                .chunks_exact(2)
                .map(|s| {
                    let sample = i16::from_le_bytes([s[0], s[1]]) as f64;
                    sample * sample
                })
                .sum();
            let count = (second.len() / 2).max(1) as f64;
            (sum_sq / count).sqrt()
        })
        .collect()
}

/// Index of the window with the highest total energy.
fn best_window_start(energy: &[f64], window_len: usize) -> usize {
    if energy.len() <= window_len {
        return 0;
    }

    let mut sum: f64 = energy[..window_len].iter().sum();
    let mut best_sum = sum;
    let mut best_start = 0;

    for start in 1..=(energy.len() - window_len) {
        sum += energy[start + window_len - 1] - energy[start - 1];
        if sum > best_sum {
            best_sum = sum;
            best_start = start;
        }
    }

    best_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(duration: f64) -> SourceMedia {
        SourceMedia {
            path: "/tmp/original.mp4".into(),
            duration_secs: duration,
            width: 1920,
            height: 1080,
        }
    }

    struct FailingStrategy;

    #[async_trait]
    impl HighlightStrategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn analyze(&self, _source: &SourceMedia, _window_secs: f64) -> MediaResult<f64> {
            Err(MediaError::analysis_failed("simulated decode error"))
        }
    }

    #[test]
    fn test_uniform_midpoint_offset() {
        assert_eq!(uniform_midpoint_offset(300.0, 60.0), 120.0);
        assert_eq!(uniform_midpoint_offset(30.0, 60.0), 0.0);
    }

    #[tokio::test]
    async fn test_midpoint_scenario() {
        let selected = select_highlight(&source(300.0), 60.0, &UniformMidpoint).await;
        assert_eq!(selected.window, HighlightWindow::new(120.0, 60.0));
        assert!(selected.fallback.is_none());
    }

    #[tokio::test]
    async fn test_window_longer_than_source_clamps() {
        let selected = select_highlight(&source(30.0), 60.0, &UniformMidpoint).await;
        assert_eq!(selected.window.start_secs, 0.0);
        assert_eq!(selected.window.duration_secs, 30.0);
    }

    #[tokio::test]
    async fn test_failing_strategy_equals_midpoint() {
        let failed = select_highlight(&source(300.0), 60.0, &FailingStrategy).await;
        let midpoint = select_highlight(&source(300.0), 60.0, &UniformMidpoint).await;
        assert_eq!(failed.window, midpoint.window);
        assert!(failed.fallback.is_some());
    }

    #[tokio::test]
    async fn test_face_strategy_falls_back() {
        let selected = select_highlight(&source(200.0), 40.0, &FaceActivity).await;
        assert_eq!(selected.window.start_secs, 80.0);
        assert!(selected.fallback.is_some());
    }

    #[test]
    fn test_per_second_energy_counts_seconds() {
        let bytes = vec![0u8; BYTES_PER_SECOND * 3 + BYTES_PER_SECOND / 2];
        assert_eq!(per_second_energy(&bytes).len(), 4);
    }

    #[test]
    fn test_best_window_start_finds_loudest_run() {
        let energy = vec![1.0, 1.0, 10.0, 12.0, 11.0, 1.0, 1.0];
        assert_eq!(best_window_start(&energy, 3), 2);
    }

    #[test]
    fn test_best_window_start_short_input() {
        assert_eq!(best_window_start(&[5.0, 1.0], 10), 0);
        assert_eq!(best_window_start(&[], 3), 0);
    }
}
