use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use crate::error::{Result, SubburnError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub captions: CaptionConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Which speech recognition program to drive
    pub implementation: TranscriberImplementation,
    /// Path to the transcriber binary; `whisper-cli` or `whisper` when unset
    pub binary_path: Option<String>,
    /// Model size used when the CLI does not override it
    pub model: ModelSize,
    /// Language hint; auto-detect when unset
    pub language: Option<String>,
    /// Where whisper.cpp ggml models are stored
    pub models_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriberImplementation {
    /// whisper.cpp `whisper-cli` with ggml models
    WhisperCpp,
    /// openai-whisper Python `whisper` command
    #[serde(rename = "openai")]
    OpenAI,
}

/// Whisper model size. whisper.cpp maps `large` to `large-v3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub const ALL: [ModelSize; 5] = [
        ModelSize::Tiny,
        ModelSize::Base,
        ModelSize::Small,
        ModelSize::Medium,
        ModelSize::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Soft limit of characters per caption line
    pub max_chars: usize,
    /// Maximum visible lines per cue
    pub max_lines: usize,
    /// What to do with a segment whose timing or text is invalid
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log the segment and keep going
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Font file used for burned-in captions; libass default when unset
    pub font_file: Option<PathBuf>,
    /// Font family name; defaults to the font file's stem
    pub font_name: Option<String>,
    /// Font size in libass script units (SRT scripts are 288 units tall)
    pub font_size: u32,
    /// Outline width around caption text
    pub outline: u32,
    /// Video encoder for the captioned output
    pub video_codec: String,
    /// Audio encoder for the captioned output
    pub audio_codec: String,
    /// Encoder thread count; ffmpeg decides when unset
    pub threads: Option<u32>,
    /// Additional ffmpeg options appended before the output path
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub extra_options: Vec<String>,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            implementation: TranscriberImplementation::WhisperCpp,
            binary_path: None,
            model: ModelSize::Base,
            language: None,
            models_dir: PathBuf::from(".subburn").join("models"),
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            max_chars: 60,
            max_lines: 2,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            font_file: None,
            font_name: None,
            // 288 / 22: a line height of roughly 1/22 of the frame
            font_size: 13,
            outline: 2,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            threads: None,
            extra_options: Vec::new(),
        }
    }
}

impl TranscriberConfig {
    /// Configured binary, or the usual name for the selected implementation
    pub fn binary(&self) -> &str {
        match (&self.binary_path, self.implementation) {
            (Some(path), _) => path.as_str(),
            (None, TranscriberImplementation::WhisperCpp) => "whisper-cli",
            (None, TranscriberImplementation::OpenAI) => "whisper",
        }
    }
}

impl CaptionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(SubburnError::Config("captions.max_chars must be at least 1".to_string()));
        }
        if self.max_lines == 0 {
            return Err(SubburnError::Config("captions.max_lines must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubburnError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SubburnError::Config(format!("Failed to parse config file: {}", e)))?;

        config.captions.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubburnError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubburnError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
