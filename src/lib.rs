//! Subburn - burned-in captions for video files
//!
//! Extracts audio with ffmpeg, transcribes it with whisper, lays the
//! transcript out as screen-sized caption cues and renders them onto the
//! video with ffmpeg's subtitles filter.

pub mod caption;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod setup;
pub mod subtitle;
pub mod transcribe;
pub mod workflow;
