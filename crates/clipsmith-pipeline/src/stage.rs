//! Pipeline stage state machine.

use std::fmt;

/// Stages of one run, in execution order, plus the terminal failure state.
///
/// `Aborted` is reachable only while acquiring or while running the core
/// transform; every stage after the transform degrades instead of aborting,
/// so a run that produces an encoded clip always reaches `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Acquiring,
    WindowSelected,
    Transformed,
    TranscribeAttempted,
    Captioned,
    Thumbnailed,
    Complete,
    Aborted,
}

impl PipelineStage {
    /// The next forward stage, if any.
    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Acquiring => Some(PipelineStage::WindowSelected),
            PipelineStage::WindowSelected => Some(PipelineStage::Transformed),
            PipelineStage::Transformed => Some(PipelineStage::TranscribeAttempted),
            PipelineStage::TranscribeAttempted => Some(PipelineStage::Captioned),
            PipelineStage::Captioned => Some(PipelineStage::Thumbnailed),
            PipelineStage::Thumbnailed => Some(PipelineStage::Complete),
            PipelineStage::Complete | PipelineStage::Aborted => None,
        }
    }

    /// Whether a failure in the work leading out of this stage aborts the
    /// run. True only for acquisition and the core transform.
    pub fn can_abort(self) -> bool {
        matches!(
            self,
            PipelineStage::Acquiring | PipelineStage::WindowSelected
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Aborted)
    }

    /// Whether `from -> to` is a legal transition.
    pub fn is_valid_transition(from: PipelineStage, to: PipelineStage) -> bool {
        if to == PipelineStage::Aborted {
            return from.can_abort();
        }
        from.next() == Some(to)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Acquiring => "acquiring",
            PipelineStage::WindowSelected => "window_selected",
            PipelineStage::Transformed => "transformed",
            PipelineStage::TranscribeAttempted => "transcribe_attempted",
            PipelineStage::Captioned => "captioned",
            PipelineStage::Thumbnailed => "thumbnailed",
            PipelineStage::Complete => "complete",
            PipelineStage::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}
