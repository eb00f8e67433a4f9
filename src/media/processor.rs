use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SubburnError};
use super::{MediaProcessorTrait, MediaCommandBuilder, SubtitleStyle};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }

    /// Caption style from configuration; the font file must exist if one is set
    pub fn subtitle_style(&self) -> Result<SubtitleStyle> {
        let mut style = SubtitleStyle {
            font_size: self.config.font_size,
            outline: self.config.outline,
            ..SubtitleStyle::default()
        };

        if let Some(font_file) = &self.config.font_file {
            if !font_file.is_file() {
                return Err(SubburnError::FileNotFound(format!(
                    "font file {}",
                    font_file.display()
                )));
            }

            style.fonts_dir = font_file.parent().map(Path::to_path_buf);
            style.font_name = self
                .config
                .font_name
                .clone()
                .or_else(|| font_file.file_stem().map(|stem| stem.to_string_lossy().to_string()));
        } else {
            style.font_name = self.config.font_name.clone();
        }

        Ok(style)
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        if !video_path.exists() {
            return Err(SubburnError::FileNotFound(video_path.display().to_string()));
        }

        let command = self.command_builder.extract_audio(video_path, audio_path);
        command.execute().await?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Burning subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        let style = self.subtitle_style()?;
        debug!("Subtitle style: {}", style.force_style());

        let command = self.command_builder.burn_subtitles(
            video_path,
            subtitle_path,
            output_path,
            &style,
            &self.config.video_codec,
            &self.config.audio_codec,
            self.config.threads,
            &self.config.extra_options,
        );

        command.execute().await?;

        info!("Subtitle burn-in completed successfully");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .execute()
            .await
            .map_err(|e| SubburnError::Media(format!("Media processor not found: {}", e)))?;

        info!("Media processor is available");
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute().await?;
        // The first line carries the version
        Ok(stdout.lines().next().unwrap_or("Unknown version").to_string())
    }
}
