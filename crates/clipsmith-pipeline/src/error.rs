//! Pipeline error types.
//!
//! Only two stages can unwind a run: acquisition and the core transform.
//! Every other stage reports failure as a degraded result value.

use thiserror::Error;

use clipsmith_media::MediaError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source acquisition failed: {0}")]
    Acquisition(#[source] MediaError),

    #[error("Core transform failed: {0}")]
    Transform(#[source] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize production record: {0}")]
    Record(#[from] serde_json::Error),
}

impl PipelineError {
    /// Whether this error aborts the run (as opposed to surfacing from the
    /// terminal record write, after all stages completed).
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            PipelineError::Acquisition(_) | PipelineError::Transform(_)
        )
    }
}
