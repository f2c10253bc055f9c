#![deny(unreachable_patterns)]
//! External tool wrappers and media stages for the Clipsmith pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with a swappable runner seam
//! - FFprobe duration/dimension probing with a never-failing fallback
//! - yt-dlp source acquisition
//! - Highlight window selection strategies
//! - Vertical reframing (scale + center crop)
//! - whisper transcription
//! - Caption burning with an ordered fallback chain
//! - Thumbnail extraction with a first-frame fallback

pub mod acquire;
pub mod captions;
pub mod command;
pub mod error;
pub mod highlight;
pub mod probe;
pub mod thumbnail;
pub mod transcribe;
pub mod transform;

pub use acquire::{Acquirer, YtDlpAcquirer};
pub use captions::{burn_captions, escape_filter_path, CaptionedClip, CAPTION_FORCE_STYLE};
pub use command::{
    check_ffmpeg, check_ffprobe, check_whisper, check_ytdlp, FfmpegCommand, FfmpegRunner,
    ToolRunner,
};
pub use error::{MediaError, MediaResult};
pub use highlight::{
    select_highlight, strategy_for, uniform_midpoint_offset, AudioEnergy, FaceActivity,
    HighlightStrategy, SelectedHighlight, UniformMidpoint,
};
pub use probe::{probe_media, probe_or_default, FALLBACK_DURATION_SECS};
pub use thumbnail::extract_thumbnail;
pub use transcribe::{Transcriber, WhisperTranscriber};
pub use transform::{render_vertical_clip, scale_crop_filter};
