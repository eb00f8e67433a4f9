use std::path::Path;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::caption::RawSegment;
use crate::config::ModelSize;
use crate::error::{Result, SubburnError};

/// Service-agnostic transcription result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Detected or requested language code
    pub language: Option<String>,
    /// Segments as reported; incomplete ones are left to the caption policy
    pub segments: Vec<RawSegment>,
}

impl Transcript {
    /// Full text, segments joined by single spaces
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|seg| seg.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SubburnError::FileNotFound(path.display().to_string()));
        }
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Writing transcript with {} segments to {}", self.segments.len(), path.display());
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Per-run transcription parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscribeOptions {
    pub model: ModelSize,
    /// Language hint; `None` lets the engine detect it
    pub language: Option<String>,
}

/// Trait for converting service-specific transcription output to [`Transcript`]
pub trait TranscriptMapper<T> {
    fn to_transcript(service_result: T) -> Result<Transcript>;
}

/// Run an external transcriber and fail with its stderr on a non-zero exit
pub async fn run_transcriber_command(mut cmd: Command, name: &str) -> Result<()> {
    debug!("Executing {} command: {:?}", name, cmd);

    let output = cmd
        .output()
        .await
        .map_err(|e| SubburnError::Transcriber(format!("Failed to execute {}: {}", name, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SubburnError::Transcriber(format!("{} failed: {}", name, stderr.trim())));
    }

    Ok(())
}

/// Check that a binary answers `--help` (whisper tools have no `--version`)
pub async fn probe_binary(binary: &str) -> Result<()> {
    let output = Command::new(binary)
        .arg("--help")
        .output()
        .await
        .map_err(|e| SubburnError::Transcriber(format!("{} not found: {}", binary, e)))?;

    if output.status.success() {
        info!("{} is available", binary);
        Ok(())
    } else {
        Err(SubburnError::Transcriber(format!("{} did not respond to --help", binary)))
    }
}
