//! Clip production orchestration.
//!
//! Wires the media stages into one run: acquire, probe, select a highlight
//! window, render the vertical clip, transcribe, burn captions, extract a
//! thumbnail, and write the production record. Only acquisition and the
//! core transform can abort a run; every later stage degrades.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod stage;

pub use config::{
    Capabilities, PipelineConfig, DEFAULT_TARGET_DURATION_SECS, DEFAULT_THUMBNAIL_TIMESTAMP_SECS,
};
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::Orchestrator;
pub use stage::PipelineStage;
