use async_trait::async_trait;
use std::path::Path;
use serde::Deserialize;
use tokio::process::Command;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, SubburnError};
use crate::caption::RawSegment;
use super::{TranscriberTrait, TranscribeOptions, Transcript, TranscriptMapper, probe_binary, run_transcriber_command};

/// openai-whisper `--output_format json` output
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIWhisperOutput {
    pub text: Option<String>,
    #[serde(default)]
    pub segments: Vec<OpenAIWhisperSegment>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIWhisperSegment {
    pub id: Option<u64>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: Option<String>,
}

/// Mapper for openai-whisper format
pub struct OpenAIMapper;

impl TranscriptMapper<OpenAIWhisperOutput> for OpenAIMapper {
    fn to_transcript(output: OpenAIWhisperOutput) -> Result<Transcript> {
        let segments = output
            .segments
            .into_iter()
            .map(|seg| RawSegment {
                start: seg.start,
                end: seg.end,
                text: seg.text,
            })
            .collect();

        Ok(Transcript {
            language: output.language,
            segments,
        })
    }
}

/// Transcriber backed by the openai-whisper `whisper` command
pub struct OpenAITranscriber {
    config: TranscriberConfig,
}

impl OpenAITranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_args(audio_path: &Path, output_dir: &Path, options: &TranscribeOptions) -> Vec<String> {
        let mut args = vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            options.model.to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--verbose".to_string(),
            "False".to_string(),
        ];

        if let Some(lang) = &options.language {
            args.push("--language".to_string());
            args.push(lang.clone());
        }

        args
    }
}

#[async_trait]
impl TranscriberTrait for OpenAITranscriber {
    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(SubburnError::FileNotFound(audio_path.display().to_string()));
        }

        info!(
            "Transcribing {} with openai-whisper model {}",
            audio_path.display(),
            options.model
        );

        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubburnError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(self.config.binary());
        cmd.args(Self::build_args(audio_path, output_dir, options));
        run_transcriber_command(cmd, self.config.binary()).await?;

        // whisper names its output after the audio file stem
        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| SubburnError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| SubburnError::Transcriber(format!("Failed to read output: {}", e)))?;

        let output: OpenAIWhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| SubburnError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))?;

        let transcript = OpenAIMapper::to_transcript(output)?;
        info!("Transcribed {} segments", transcript.segments.len());
        Ok(transcript)
    }

    async fn check_availability(&self) -> Result<()> {
        probe_binary(self.config.binary()).await
    }
}
