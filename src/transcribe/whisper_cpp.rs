use async_trait::async_trait;
use std::path::Path;
use serde::Deserialize;
use tokio::process::Command;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, SubburnError};
use crate::setup::ModelManager;
use crate::caption::RawSegment;
use super::{TranscriberTrait, TranscribeOptions, Transcript, TranscriptMapper, probe_binary, run_transcriber_command};

/// whisper.cpp `-oj` output
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperCppOutput {
    pub result: Option<WhisperCppResult>,
    #[serde(default)]
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhisperCppResult {
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhisperCppSegment {
    pub offsets: Option<WhisperCppOffsets>,
    pub text: Option<String>,
}

/// Segment bounds in milliseconds
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// Mapper for whisper.cpp format
pub struct WhisperCppMapper;

impl TranscriptMapper<WhisperCppOutput> for WhisperCppMapper {
    fn to_transcript(output: WhisperCppOutput) -> Result<Transcript> {
        let segments = output
            .transcription
            .into_iter()
            .map(|seg| {
                let (from, to) = match seg.offsets {
                    Some(offsets) => (offsets.from, offsets.to),
                    None => (None, None),
                };
                RawSegment {
                    start: from.map(|ms| ms as f64 / 1000.0),
                    end: to.map(|ms| ms as f64 / 1000.0),
                    text: seg.text,
                }
            })
            .collect();

        Ok(Transcript {
            language: output.result.and_then(|r| r.language),
            segments,
        })
    }
}

/// Transcriber backed by whisper.cpp's `whisper-cli`
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
    models: ModelManager,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self> {
        let models = ModelManager::new(&config.models_dir)?;
        Ok(Self { config, models })
    }

    /// Arguments for one run; whisper.cpp appends `.json` to `output_prefix`
    fn build_args(model_path: &Path, audio_path: &Path, output_prefix: &Path, language: Option<&str>) -> Vec<String> {
        vec![
            "-m".to_string(),
            model_path.to_string_lossy().to_string(),
            "-f".to_string(),
            audio_path.to_string_lossy().to_string(),
            "-l".to_string(),
            language.unwrap_or("auto").to_string(),
            "-oj".to_string(),
            "-of".to_string(),
            output_prefix.to_string_lossy().to_string(),
            "-np".to_string(),
        ]
    }
}

#[async_trait]
impl TranscriberTrait for WhisperCppTranscriber {
    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(SubburnError::FileNotFound(audio_path.display().to_string()));
        }

        let model_path = self.models.ensure_model(options.model).await?;
        info!(
            "Transcribing {} with whisper.cpp model {}",
            audio_path.display(),
            options.model
        );

        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubburnError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_prefix = temp_dir.path().join("transcript");

        let mut cmd = Command::new(self.config.binary());
        cmd.args(Self::build_args(
            &model_path,
            audio_path,
            &output_prefix,
            options.language.as_deref(),
        ));
        run_transcriber_command(cmd, self.config.binary()).await?;

        let json_file = output_prefix.with_extension("json");
        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| SubburnError::Transcriber(format!("Failed to read output: {}", e)))?;

        let output: WhisperCppOutput = serde_json::from_str(&json_content)
            .map_err(|e| SubburnError::Transcriber(format!("Failed to parse whisper.cpp JSON: {}", e)))?;

        let transcript = WhisperCppMapper::to_transcript(output)?;
        info!("Transcribed {} segments", transcript.segments.len());
        Ok(transcript)
    }

    async fn check_availability(&self) -> Result<()> {
        probe_binary(self.config.binary()).await
    }
}
