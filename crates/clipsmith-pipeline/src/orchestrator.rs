//! The clip production orchestrator.
//!
//! Sequences acquisition, probing, highlight selection, the core vertical
//! transform, transcription, caption burning, and thumbnail extraction, and
//! assembles the terminal production record. Acquisition and the core
//! transform are the only fatal stages; everything afterwards degrades.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use clipsmith_media::{
    burn_captions, extract_thumbnail, probe_or_default, render_vertical_clip, select_highlight,
    strategy_for, Acquirer, FfmpegRunner, ToolRunner, Transcriber, UniformMidpoint,
    WhisperTranscriber, YtDlpAcquirer,
};
use clipsmith_models::{Degradation, ProductionRecord, SourceMedia, Transcript};

use crate::config::{Capabilities, PipelineConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::stage::PipelineStage;

/// Owns the lifecycle of all artifacts for one run.
pub struct Orchestrator {
    config: PipelineConfig,
    capabilities: Capabilities,
    runner: Arc<dyn ToolRunner>,
    acquirer: Arc<dyn Acquirer>,
    transcriber: Arc<dyn Transcriber>,
}

impl Orchestrator {
    /// Build an orchestrator over the real external tools, probing PATH for
    /// optional capabilities.
    pub fn new(config: PipelineConfig) -> Self {
        let mut runner = FfmpegRunner::new();
        if let Some(secs) = config.tool_timeout_secs {
            runner = runner.with_timeout(secs);
        }

        Self {
            capabilities: Capabilities::detect(),
            runner: Arc::new(runner),
            acquirer: Arc::new(YtDlpAcquirer::new()),
            transcriber: Arc::new(WhisperTranscriber::new()),
            config,
        }
    }

    /// Build an orchestrator with explicit collaborators and capabilities.
    pub fn with_collaborators(
        config: PipelineConfig,
        capabilities: Capabilities,
        runner: Arc<dyn ToolRunner>,
        acquirer: Arc<dyn Acquirer>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            config,
            capabilities,
            runner,
            acquirer,
            transcriber,
        }
    }

    /// Run the pipeline once, returning the production record on completion.
    ///
    /// An `Err` from this method is an aborted run: the source was
    /// unreachable or the core transform failed.
    pub async fn run(&self) -> PipelineResult<ProductionRecord> {
        let run_id = Uuid::new_v4();
        let created_at = Utc::now();
        let stamp = created_at.format("%Y%m%d_%H%M%S").to_string();
        let mut degradations: Vec<Degradation> = Vec::new();
        let mut stage = PipelineStage::Acquiring;

        info!(
            run_id = %run_id,
            source = %self.config.source,
            stage = %stage,
            "Starting clip production"
        );

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let work_dir = self.config.output_dir.join(format!(".work-{}", run_id));
        tokio::fs::create_dir_all(&work_dir).await?;

        // Acquire; failure here is one of the two fatal conditions.
        let source_path = match self
            .acquirer
            .acquire(&self.config.source, self.config.quality, &work_dir)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                self.advance(&mut stage, PipelineStage::Aborted);
                cleanup_work_dir(&work_dir).await;
                return Err(PipelineError::Acquisition(e));
            }
        };

        // Probe never fails outward; record the fallback if it degraded.
        let (info, probe_error) = probe_or_default(&source_path).await;
        if let Some(e) = probe_error {
            degradations.push(Degradation::ProbeFallback(e.to_string()));
        }
        let source = SourceMedia::new(&source_path, info);

        // Select the highlight window.
        let strategy = self.resolve_strategy(&mut degradations);
        let selected =
            select_highlight(&source, self.config.target_duration_secs, strategy.as_ref()).await;
        if let Some(reason) = selected.fallback {
            degradations.push(Degradation::HighlightFallback(reason));
        }
        let window = selected.window;
        self.advance(&mut stage, PipelineStage::WindowSelected);

        // Core transform; the other fatal condition.
        let clip_path = self.config.output_dir.join(format!("clip_{}.mp4", stamp));
        if let Err(e) = render_vertical_clip(
            self.runner.as_ref(),
            &source,
            window,
            &self.config.encoding,
            &clip_path,
        )
        .await
        {
            self.advance(&mut stage, PipelineStage::Aborted);
            cleanup_work_dir(&work_dir).await;
            return Err(PipelineError::Transform(e));
        }
        self.advance(&mut stage, PipelineStage::Transformed);

        // From here on the run always completes; stages degrade instead.
        let transcript = self.attempt_transcription(&clip_path, &work_dir, &mut degradations).await;
        self.advance(&mut stage, PipelineStage::TranscribeAttempted);

        let subtitles_path = match &transcript {
            Some(t) => {
                self.persist_subtitles(t, &stamp).await
            }
            None => None,
        };

        let final_path = self.config.output_dir.join(format!("final_{}.mp4", stamp));
        let (captioned, caption_degradation) = burn_captions(
            self.runner.as_ref(),
            &clip_path,
            transcript.as_ref(),
            &self.config.encoding,
            &final_path,
        )
        .await;
        degradations.extend(caption_degradation);
        self.advance(&mut stage, PipelineStage::Captioned);

        let thumbnail_path = self
            .config
            .output_dir
            .join(format!("thumbnail_{}.png", stamp));
        let thumbnail = match extract_thumbnail(
            self.runner.as_ref(),
            &captioned.path,
            self.config.thumbnail_timestamp_secs,
            &thumbnail_path,
        )
        .await
        {
            Ok(()) => Some(thumbnail_path),
            Err(e) => {
                degradations.push(Degradation::ThumbnailOmitted(e.to_string()));
                None
            }
        };
        self.advance(&mut stage, PipelineStage::Thumbnailed);

        let record = ProductionRecord {
            source: self.config.source.clone(),
            window,
            quality: self.config.quality,
            clip_path,
            final_path: captioned.path.clone(),
            thumbnail_path: thumbnail,
            subtitles_path,
            transcript_available: transcript.is_some(),
            caption_outcome: captioned.outcome,
            degradations: degradations.clone(),
            created_at,
        };

        let record_path = self
            .config
            .output_dir
            .join(format!("metadata_{}.json", stamp));
        tokio::fs::write(&record_path, serde_json::to_vec_pretty(&record)?).await?;

        cleanup_work_dir(&work_dir).await;
        self.advance(&mut stage, PipelineStage::Complete);

        if degradations.is_empty() {
            info!(run_id = %run_id, final_path = %record.final_path.display(), "Pipeline complete");
        } else {
            let summary: Vec<String> = degradations.iter().map(|d| d.to_string()).collect();
            info!(
                run_id = %run_id,
                final_path = %record.final_path.display(),
                degraded = ?summary,
                "Pipeline complete with degraded stages"
            );
        }

        Ok(record)
    }

    /// Resolve the configured highlight strategy, honoring the capability
    /// flag for content analysis.
    fn resolve_strategy(
        &self,
        degradations: &mut Vec<Degradation>,
    ) -> Box<dyn clipsmith_media::HighlightStrategy> {
        let wants_analysis = !matches!(
            self.config.strategy.as_str(),
            "uniform-midpoint" | "midpoint"
        );
        if wants_analysis && !self.capabilities.content_analysis {
            warn!(
                strategy = %self.config.strategy,
                "Content analysis capability not available, using uniform-midpoint"
            );
            degradations.push(Degradation::HighlightFallback(
                "content analysis capability not available".to_string(),
            ));
            return Box::new(UniformMidpoint);
        }
        strategy_for(&self.config.strategy, self.runner.clone())
    }

    /// Attempt transcription; absence or failure degrades, never aborts.
    async fn attempt_transcription(
        &self,
        clip_path: &Path,
        work_dir: &Path,
        degradations: &mut Vec<Degradation>,
    ) -> Option<Transcript> {
        if !self.capabilities.transcription {
            info!("Transcription capability not available, skipping captions");
            degradations.push(Degradation::TranscriptUnavailable(
                "transcription capability not available".to_string(),
            ));
            return None;
        }

        match self
            .transcriber
            .transcribe(clip_path, &self.config.language, work_dir)
            .await
        {
            Ok(transcript) => Some(transcript),
            Err(e) => {
                warn!(error = %e, "Transcription failed, captioning will be skipped");
                degradations.push(Degradation::TranscriptUnavailable(e.to_string()));
                None
            }
        }
    }

    /// Write the SRT artifact next to the other outputs. Failure only costs
    /// the subtitle file, not the transcript itself.
    async fn persist_subtitles(&self, transcript: &Transcript, stamp: &str) -> Option<PathBuf> {
        let path = self
            .config
            .output_dir
            .join(format!("subtitles_{}.srt", stamp));
        match tokio::fs::write(&path, transcript.to_srt()).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write subtitle artifact");
                None
            }
        }
    }

    fn advance(&self, stage: &mut PipelineStage, to: PipelineStage) {
        debug_assert!(
            PipelineStage::is_valid_transition(*stage, to),
            "invalid stage transition {} -> {}",
            stage,
            to
        );
        debug!(from = %stage, to = %to, "Stage transition");
        *stage = to;
    }
}

/// Remove the per-run work directory; best effort on every exit path.
async fn cleanup_work_dir(work_dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(work_dir).await {
        warn!(
            work_dir = %work_dir.display(),
            error = %e,
            "Failed to remove work directory"
        );
    }
}
