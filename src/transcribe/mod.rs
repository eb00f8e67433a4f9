// Modular transcription architecture
//
// Each speech recognition program is wrapped behind TranscriberTrait:
// - WhisperCpp: whisper.cpp `whisper-cli` with ggml models
// - OpenAI: openai-whisper `whisper` command
//
// To add a new transcription service:
// 1. Create service-specific data structures for parsing its JSON
// 2. Implement TranscriptMapper for them
// 3. Add the service to TranscriberImplementation
// 4. Update the factory to create your implementation

pub mod common;
pub mod openai;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::{TranscriberConfig, TranscriberImplementation};
use crate::error::Result;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Transcribe audio file to timestamped segments
    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<Transcript>;

    /// Check if the transcriber binary is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the transcriber selected in the configuration
    pub fn create_transcriber(config: TranscriberConfig) -> Result<Box<dyn TranscriberTrait>> {
        let transcriber: Box<dyn TranscriberTrait> = match config.implementation {
            TranscriberImplementation::WhisperCpp => {
                Box::new(whisper_cpp::WhisperCppTranscriber::new(config)?)
            }
            TranscriberImplementation::OpenAI => {
                Box::new(openai::OpenAITranscriber::new(config))
            }
        };
        Ok(transcriber)
    }
}
