use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubburnError};

/// Abstract media processing command representation
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    pub fn threads(self, threads: Option<u32>) -> Self {
        match threads {
            Some(n) => self.arg("-threads").arg(n.to_string()),
            None => self,
        }
    }

    /// Execute the command, returning its stdout
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| SubburnError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubburnError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Look of burned-in captions: white text, black outline, bottom centre
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStyle {
    /// Font family; libass default when `None`
    pub font_name: Option<String>,
    /// Directory libass searches for `font_name`
    pub fonts_dir: Option<PathBuf>,
    pub font_size: u32,
    pub outline: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_name: None,
            fonts_dir: None,
            font_size: 13,
            outline: 2,
        }
    }
}

impl SubtitleStyle {
    /// ASS style overrides for the `force_style` option
    pub fn force_style(&self) -> String {
        let mut fields = Vec::new();
        if let Some(name) = &self.font_name {
            fields.push(format!("FontName={}", name));
        }
        fields.push(format!("FontSize={}", self.font_size));
        fields.push("PrimaryColour=&H00FFFFFF".to_string());
        fields.push("OutlineColour=&H00000000".to_string());
        fields.push("BorderStyle=1".to_string());
        fields.push(format!("Outline={}", self.outline));
        fields.push("Alignment=2".to_string());
        fields.join(",")
    }

    /// Full `subtitles=` filter description for `subtitle_path`
    pub fn filter(&self, subtitle_path: &Path) -> String {
        let mut filter = format!(
            "subtitles=filename={}",
            escape_filter_value(&subtitle_path.to_string_lossy())
        );
        if let Some(dir) = &self.fonts_dir {
            filter.push_str(&format!(":fontsdir={}", escape_filter_value(&dir.to_string_lossy())));
        }
        filter.push_str(&format!(":force_style={}", escape_filter_value(&self.force_style())));
        filter
    }
}

/// Escape an option value for use inside an ffmpeg filtergraph.
///
/// Applies the option-level escaping (`\`, `'`, `:`) and then the
/// graph-level escaping (`\`, `'`, `[`, `]`, `,`, `;`).
pub fn escape_filter_value(value: &str) -> String {
    let mut option_level = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }

    let mut graph_level = String::with_capacity(option_level.len());
    for c in option_level.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            graph_level.push('\\');
        }
        graph_level.push(c);
    }
    graph_level
}

/// Builder for the ffmpeg invocations the pipeline needs
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build subtitle burn-in command
    #[allow(clippy::too_many_arguments)]
    pub fn burn_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        output_path: P,
        style: &SubtitleStyle,
        video_codec: &str,
        audio_codec: &str,
        threads: Option<u32>,
        additional_options: &[String],
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Subtitle burn-in")
            .overwrite()
            .input(&video_path)
            .video_filter(style.filter(subtitle_path.as_ref()))
            .video_codec(video_codec)
            .audio_codec(audio_codec)
            .threads(threads)
            .args(additional_options.iter().cloned())
            .output(output_path)
    }

    /// Build audio extraction command: 16 kHz mono PCM as whisper expects
    pub fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .arg("-acodec")
            .arg("pcm_s16le")
            .audio_sample_rate(16000)
            .audio_channels(1)
            .overwrite()
            .output(audio_path)
    }

    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}
