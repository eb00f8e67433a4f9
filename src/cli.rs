use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ModelSize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe a video and burn the captions into it
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output video file (default: subtitled_<input> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Whisper model size
        #[arg(short, long, value_enum)]
        model: Option<ModelSize>,

        /// Language of the video (auto-detected when omitted)
        #[arg(short, long)]
        language: Option<String>,

        /// Font file for the captions
        #[arg(long)]
        font: Option<PathBuf>,

        /// Also save the subtitles next to the output video
        #[arg(long)]
        keep_srt: bool,
    },

    /// Process all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for processed files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Whisper model size
        #[arg(short, long, value_enum)]
        model: Option<ModelSize>,

        /// Language of the videos (auto-detected when omitted)
        #[arg(short, long)]
        language: Option<String>,

        /// Font file for the captions
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe audio to a JSON transcript
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output transcript file
        #[arg(short, long)]
        output: PathBuf,

        /// Whisper model size
        #[arg(short, long, value_enum)]
        model: Option<ModelSize>,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Lay out a JSON transcript as SRT or WebVTT captions
    Caption {
        /// Input transcript file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file (.srt or .vtt)
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum characters per line
        #[arg(long)]
        max_chars: Option<usize>,

        /// Maximum lines per caption
        #[arg(long)]
        max_lines: Option<usize>,
    },

    /// Burn a subtitle file into a video
    Embed {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Subtitle file
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,

        /// Font file for the captions
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// List whisper.cpp models and their status
    Models {
        /// Download all missing models
        #[arg(long)]
        download: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
