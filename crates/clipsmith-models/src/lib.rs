//! Shared data models for the Clipsmith pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Probed source media and highlight windows
//! - Encoding configuration and quality tiers
//! - Timed transcripts with SRT rendering
//! - The terminal production record

pub mod encoding;
pub mod media;
pub mod record;
pub mod transcript;
pub mod window;

// Re-export common types
pub use encoding::{EncodingConfig, QualityTier, TARGET_HEIGHT, TARGET_WIDTH};
pub use media::{MediaInfo, SourceMedia};
pub use record::{CaptionOutcome, Degradation, ProductionRecord};
pub use transcript::{Transcript, TranscriptError, TranscriptSegment};
pub use window::HighlightWindow;
