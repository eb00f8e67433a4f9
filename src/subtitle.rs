use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::caption::CaptionCue;
use crate::error::{Result, SubburnError};

/// Subtitle file formats the writer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// Pick a format from the file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("srt") => Ok(SubtitleFormat::Srt),
            Some("vtt") => Ok(SubtitleFormat::Vtt),
            _ => Err(SubburnError::UnsupportedFormat(format!(
                "{} (expected .srt or .vtt)",
                path.display()
            ))),
        }
    }
}

/// Write cues to `output_path`, format chosen by extension
pub async fn write_subtitles<P: AsRef<Path>>(cues: &[CaptionCue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    let content = match SubtitleFormat::from_path(output_path)? {
        SubtitleFormat::Srt => render_srt(cues),
        SubtitleFormat::Vtt => render_vtt(cues),
    };

    info!("Writing {} cues to {}", cues.len(), output_path.display());
    fs::write(output_path, content).await?;
    Ok(())
}

/// Generate SRT subtitle file from caption cues
pub async fn generate_srt<P: AsRef<Path>>(cues: &[CaptionCue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, render_srt(cues)).await?;

    info!("SRT file generated successfully");
    Ok(())
}

pub fn render_srt(cues: &[CaptionCue]) -> String {
    let mut srt_content = String::new();

    for (index, cue) in cues.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.text
        ));
    }

    srt_content
}

pub fn render_vtt(cues: &[CaptionCue]) -> String {
    let mut vtt_content = String::from("WEBVTT\n\n");

    for cue in cues {
        vtt_content.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_vtt_time(cue.start),
            format_vtt_time(cue.end),
            cue.text
        ));
    }

    vtt_content
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;
    (hours, minutes, secs, millis)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
fn format_srt_time(seconds: f64) -> String {
    let (hours, minutes, secs, millis) = split_millis(seconds);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Format time in seconds to WebVTT time format (HH:MM:SS.mmm)
fn format_vtt_time(seconds: f64) -> String {
    let (hours, minutes, secs, millis) = split_millis(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
