use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::caption::{CaptionChunker, CaptionCue};
use crate::config::Config;
use crate::error::{Result, SubburnError};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::{generate_srt, write_subtitles};
use crate::transcribe::{TranscribeOptions, TranscriberFactory, TranscriberTrait, Transcript};

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];
const OUTPUT_PREFIX: &str = "subtitled_";

pub struct Workflow {
    config: Config,
    chunker: CaptionChunker,
    transcriber: Box<dyn TranscriberTrait>,
    media: Box<dyn MediaProcessorTrait>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone())?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        Self::with_components(config, transcriber, media)
    }

    /// Build a workflow around existing collaborators
    pub fn with_components(
        config: Config,
        transcriber: Box<dyn TranscriberTrait>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Result<Self> {
        let chunker = CaptionChunker::from_config(&config.captions)?;
        Ok(Self {
            config,
            chunker,
            transcriber,
            media,
        })
    }

    /// Check that ffmpeg and the transcriber can be executed
    pub async fn check_dependencies(&self) -> Result<()> {
        self.media.check_availability().await?;
        info!("Using {}", self.media.get_version_info().await?);
        self.transcriber.check_availability().await
    }

    /// Transcription options from configuration
    pub fn transcribe_options(&self) -> TranscribeOptions {
        TranscribeOptions {
            model: self.config.transcriber.model,
            language: self.config.transcriber.language.clone(),
        }
    }

    /// `<dir>/subtitled_<name>` next to the input video
    pub fn default_output_path<P: AsRef<Path>>(input_path: P) -> Result<PathBuf> {
        let input_path = input_path.as_ref();
        let file_name = input_path
            .file_name()
            .ok_or_else(|| SubburnError::Config("Invalid video filename".to_string()))?;
        let parent = input_path.parent().unwrap_or_else(|| Path::new(""));
        Ok(parent.join(format!("{}{}", OUTPUT_PREFIX, file_name.to_string_lossy())))
    }

    /// Captions for a whole transcript, honouring the malformed-segment policy
    pub fn caption(&self, transcript: &Transcript) -> Result<Vec<CaptionCue>> {
        self.chunker
            .chunk_segments(&transcript.segments, self.config.captions.on_malformed)
    }

    /// Transcribe a video and burn the captions into a copy of it
    pub async fn process_video<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Option<&Path>,
        options: &TranscribeOptions,
        keep_srt: bool,
    ) -> Result<PathBuf> {
        let input_path = input_path.as_ref();
        info!("Processing video: {}", input_path.display());

        if !input_path.exists() {
            return Err(SubburnError::FileNotFound(input_path.display().to_string()));
        }

        let output_path = match output_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_output_path(input_path)?,
        };

        if let Some(output_dir) = output_path.parent() {
            if !output_dir.as_os_str().is_empty() {
                fs::create_dir_all(output_dir).await?;
            }
        }

        // Removed on drop, whichever step fails
        let work_dir = tempfile::Builder::new().prefix("subburn-").tempdir()?;
        let audio_path = work_dir.path().join("audio.wav");
        let srt_path = work_dir.path().join("captions.srt");

        // Step 1: Extract audio
        self.media.extract_audio(input_path, &audio_path).await?;
        if !audio_path.exists() {
            return Err(SubburnError::Media(format!(
                "Audio extraction produced no file at {}",
                audio_path.display()
            )));
        }

        // Step 2: Transcribe
        let transcript = self.transcriber.transcribe(&audio_path, options).await?;
        info!(
            "Transcribed {} segments (language: {})",
            transcript.segments.len(),
            transcript.language.as_deref().unwrap_or("unknown")
        );

        // Step 3: Lay out captions
        let cues = self.caption(&transcript)?;
        info!("Generated {} caption cues", cues.len());

        // Step 4: Write SRT and burn it in
        generate_srt(&cues, &srt_path).await?;
        if cues.is_empty() {
            warn!("No speech found in {}, copying it unchanged", input_path.display());
            fs::copy(input_path, &output_path).await?;
        } else {
            self.media.burn_subtitles(input_path, &srt_path, &output_path).await?;
        }

        if keep_srt {
            let sidecar = output_path.with_extension("srt");
            fs::copy(&srt_path, &sidecar).await?;
            info!("Saved subtitles to {}", sidecar.display());
        }

        info!("Successfully processed video. Output saved to: {}", output_path.display());
        Ok(output_path)
    }

    /// Process all video files in a directory
    pub async fn process_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<&Path>,
        options: &TranscribeOptions,
    ) -> Result<Vec<PathBuf>> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubburnError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let video_files = find_videos(input_dir);
        info!("Found {} video files to process", video_files.len());

        let mut outputs = Vec::new();
        for video_path in video_files {
            // outputs mirror the input tree
            let output_path = match output_dir {
                Some(output_dir) => {
                    let relative = video_path.strip_prefix(input_dir).unwrap_or(&video_path);
                    let default_path = Self::default_output_path(relative)?;
                    output_dir.join(default_path)
                }
                None => Self::default_output_path(&video_path)?,
            };

            match self.process_video(&video_path, Some(&output_path), options, false).await {
                Ok(path) => {
                    info!("Successfully processed: {}", video_path.display());
                    outputs.push(path);
                }
                Err(e) => warn!("Failed to process {}: {}", video_path.display(), e),
            }
        }

        Ok(outputs)
    }

    /// Extract audio from video file
    pub async fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> Result<()> {
        self.media
            .extract_audio(video_path.as_ref(), audio_path.as_ref())
            .await
    }

    /// Transcribe audio file and save the transcript as JSON
    pub async fn transcribe_audio<P: AsRef<Path>>(
        &self,
        audio_path: P,
        output_path: P,
        options: &TranscribeOptions,
    ) -> Result<Transcript> {
        let transcript = self.transcriber.transcribe(audio_path.as_ref(), options).await?;
        transcript.save(output_path).await?;
        Ok(transcript)
    }

    /// Turn a transcript JSON file into a subtitle file; returns the cue count
    pub async fn caption_transcript<P: AsRef<Path>>(&self, transcript_path: P, output_path: P) -> Result<usize> {
        let transcript = Transcript::load(transcript_path).await?;
        let cues = self.caption(&transcript)?;
        write_subtitles(&cues, output_path).await?;
        Ok(cues.len())
    }

    /// Burn an existing subtitle file into a video
    pub async fn embed_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitles_path: P,
        output_path: P,
    ) -> Result<()> {
        let video_path = video_path.as_ref();
        let subtitles_path = subtitles_path.as_ref();

        for path in [video_path, subtitles_path] {
            if !path.exists() {
                return Err(SubburnError::FileNotFound(path.display().to_string()));
            }
        }

        self.media
            .burn_subtitles(video_path, subtitles_path, output_path.as_ref())
            .await
    }
}

/// Video files under `dir`, skipping outputs of earlier runs
fn find_videos(dir: &Path) -> Vec<PathBuf> {
    let mut videos: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let is_video = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            let is_output = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with(OUTPUT_PREFIX))
                .unwrap_or(false);
            is_video && !is_output
        })
        .collect();
    videos.sort();
    videos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::TranscriptSegment;
    use crate::config::MalformedPolicy;
    use crate::media::MockMediaProcessorTrait;
    use crate::transcribe::MockTranscriberTrait;
    use assert_fs::prelude::*;
    use std::sync::{Arc, Mutex};

    fn transcript() -> Transcript {
        Transcript {
            language: Some("en".to_string()),
            segments: vec![
                TranscriptSegment::new(0.0, 2.0, "Hello there").into(),
                TranscriptSegment::new(3.0, 2.5, "broken").into(),
                TranscriptSegment::new(4.0, 6.0, "General Kenobi").into(),
            ],
        }
    }

    fn media_writing_outputs(srt_seen: Arc<Mutex<String>>) -> MockMediaProcessorTrait {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, audio| {
            std::fs::write(audio, b"RIFF")?;
            Ok(())
        });
        media.expect_burn_subtitles().returning(move |_, srt, out| {
            *srt_seen.lock().unwrap() = std::fs::read_to_string(srt)?;
            std::fs::write(out, b"video")?;
            Ok(())
        });
        media
    }

    #[test]
    fn test_default_output_path() {
        let path = Workflow::default_output_path("videos/clip.mp4").unwrap();
        assert_eq!(path, PathBuf::from("videos/subtitled_clip.mp4"));
    }

    #[tokio::test]
    async fn test_process_video_end_to_end() {
        let dir = assert_fs::TempDir::new().unwrap();
        let input = dir.child("clip.mp4");
        input.write_binary(b"video").unwrap();

        let srt_seen = Arc::new(Mutex::new(String::new()));
        let media = media_writing_outputs(srt_seen.clone());

        let mut transcriber = MockTranscriberTrait::new();
        transcriber
            .expect_transcribe()
            .withf(|audio, options| audio.ends_with("audio.wav") && options.language.as_deref() == Some("en"))
            .times(1)
            .returning(|_, _| Ok(transcript()));

        let workflow = Workflow::with_components(Config::default(), Box::new(transcriber), Box::new(media)).unwrap();
        let options = TranscribeOptions {
            language: Some("en".to_string()),
            ..TranscribeOptions::default()
        };

        let output = workflow.process_video(input.path(), None, &options, true).await.unwrap();

        assert_eq!(output, dir.path().join("subtitled_clip.mp4"));
        assert!(output.exists());
        let srt = srt_seen.lock().unwrap().clone();
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,000\nHello there\n\n\
             2\n00:00:04,000 --> 00:00:06,000\nGeneral Kenobi\n\n"
        );
        let sidecar = dir.path().join("subtitled_clip.srt");
        assert_eq!(std::fs::read_to_string(sidecar).unwrap(), srt);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_before_burn_in() {
        let dir = assert_fs::TempDir::new().unwrap();
        let input = dir.child("clip.mp4");
        input.write_binary(b"video").unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, audio| {
            std::fs::write(audio, b"RIFF")?;
            Ok(())
        });
        media.expect_burn_subtitles().never();

        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().returning(|_, _| Ok(transcript()));

        let mut config = Config::default();
        config.captions.on_malformed = MalformedPolicy::Abort;
        let workflow = Workflow::with_components(config, Box::new(transcriber), Box::new(media)).unwrap();

        let err = workflow
            .process_video(input.path(), None, &TranscribeOptions::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SubburnError::MalformedSegment(_)));
    }

    #[tokio::test]
    async fn test_temporary_audio_removed_after_failure() {
        let dir = assert_fs::TempDir::new().unwrap();
        let input = dir.child("clip.mp4");
        input.write_binary(b"video").unwrap();

        let audio_seen: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
        let audio_capture = audio_seen.clone();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(move |_, audio| {
            std::fs::write(audio, b"RIFF")?;
            *audio_capture.lock().unwrap() = Some(audio.to_path_buf());
            Ok(())
        });

        let mut transcriber = MockTranscriberTrait::new();
        transcriber
            .expect_transcribe()
            .returning(|_, _| Err(SubburnError::Transcriber("model crashed".to_string())));

        let workflow = Workflow::with_components(Config::default(), Box::new(transcriber), Box::new(media)).unwrap();
        let result = workflow
            .process_video(input.path(), None, &TranscribeOptions::default(), false)
            .await;

        assert!(matches!(result, Err(SubburnError::Transcriber(_))));
        let audio = audio_seen.lock().unwrap().clone().unwrap();
        assert!(!audio.exists());
        assert!(!dir.path().join("subtitled_clip.mp4").exists());
    }

    #[tokio::test]
    async fn test_missing_input_video() {
        let workflow = Workflow::with_components(
            Config::default(),
            Box::new(MockTranscriberTrait::new()),
            Box::new(MockMediaProcessorTrait::new()),
        )
        .unwrap();

        let err = workflow
            .process_video("/nonexistent/clip.mp4", None, &TranscribeOptions::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SubburnError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_output_directory_is_created() {
        let dir = assert_fs::TempDir::new().unwrap();
        let input = dir.child("clip.mp4");
        input.write_binary(b"video").unwrap();
        let output = dir.path().join("nested").join("out").join("result.mp4");

        let media = media_writing_outputs(Arc::new(Mutex::new(String::new())));
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().returning(|_, _| Ok(transcript()));

        let workflow = Workflow::with_components(Config::default(), Box::new(transcriber), Box::new(media)).unwrap();
        let produced = workflow
            .process_video(input.path(), Some(&output), &TranscribeOptions::default(), false)
            .await
            .unwrap();

        assert_eq!(produced, output);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_silent_video_is_copied_without_burn_in() {
        let dir = assert_fs::TempDir::new().unwrap();
        let input = dir.child("silent.mp4");
        input.write_binary(b"original frames").unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, audio| {
            std::fs::write(audio, b"RIFF")?;
            Ok(())
        });
        media.expect_burn_subtitles().never();

        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().returning(|_, _| Ok(Transcript::default()));

        let workflow = Workflow::with_components(Config::default(), Box::new(transcriber), Box::new(media)).unwrap();
        let output = workflow
            .process_video(input.path(), None, &TranscribeOptions::default(), false)
            .await
            .unwrap();

        assert_eq!(std::fs::read(output).unwrap(), b"original frames");
    }

    #[tokio::test]
    async fn test_process_directory_keeps_nested_names_apart() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("a").child("clip.mp4").write_binary(b"video").unwrap();
        dir.child("b").child("clip.mp4").write_binary(b"video").unwrap();
        let out_dir = dir.path().join("out");

        let burned: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));
        let burned_capture = burned.clone();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, audio| {
            std::fs::write(audio, b"RIFF")?;
            Ok(())
        });
        media.expect_burn_subtitles().returning(move |_, _, out| {
            std::fs::write(out, b"video")?;
            burned_capture.lock().unwrap().push(out.to_path_buf());
            Ok(())
        });

        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().returning(|_, _| Ok(transcript()));

        let workflow = Workflow::with_components(Config::default(), Box::new(transcriber), Box::new(media)).unwrap();

        let beside = workflow
            .process_directory(dir.path(), None, &TranscribeOptions::default())
            .await
            .unwrap();
        assert_eq!(
            beside,
            vec![
                dir.path().join("a").join("subtitled_clip.mp4"),
                dir.path().join("b").join("subtitled_clip.mp4"),
            ]
        );

        let mirrored = workflow
            .process_directory(dir.path(), Some(&out_dir), &TranscribeOptions::default())
            .await
            .unwrap();
        assert_eq!(
            mirrored,
            vec![
                out_dir.join("a").join("subtitled_clip.mp4"),
                out_dir.join("b").join("subtitled_clip.mp4"),
            ]
        );
        assert_eq!(burned.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_process_directory_continues_after_failure() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("a.mp4").write_binary(b"video").unwrap();
        dir.child("b.MKV").write_binary(b"video").unwrap();
        dir.child("subtitled_old.mp4").write_binary(b"video").unwrap();
        dir.child("notes.txt").write_str("not a video").unwrap();
        let out_dir = dir.path().join("out");

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().times(2).returning(|video, audio| {
            if video.ends_with("a.mp4") {
                return Err(SubburnError::Media("corrupt stream".to_string()));
            }
            std::fs::write(audio, b"RIFF")?;
            Ok(())
        });
        media.expect_burn_subtitles().times(1).returning(|_, _, out| {
            std::fs::write(out, b"video")?;
            Ok(())
        });

        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().times(1).returning(|_, _| Ok(transcript()));

        let workflow = Workflow::with_components(Config::default(), Box::new(transcriber), Box::new(media)).unwrap();
        let outputs = workflow
            .process_directory(dir.path(), Some(&out_dir), &TranscribeOptions::default())
            .await
            .unwrap();

        assert_eq!(outputs, vec![out_dir.join("subtitled_b.MKV")]);
    }

    #[tokio::test]
    async fn test_caption_transcript_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let transcript_path = dir.path().join("transcript.json");
        transcript().save(&transcript_path).await.unwrap();
        let srt_path = dir.path().join("captions.srt");

        let mut config = Config::default();
        config.captions.max_chars = 5;
        config.captions.max_lines = 1;
        let workflow = Workflow::with_components(
            config,
            Box::new(MockTranscriberTrait::new()),
            Box::new(MockMediaProcessorTrait::new()),
        )
        .unwrap();

        let count = workflow.caption_transcript(&transcript_path, &srt_path).await.unwrap();

        // "Hello"/"there" and "General"/"Kenobi"; the reversed segment is skipped
        assert_eq!(count, 4);
        let srt = std::fs::read_to_string(&srt_path).unwrap();
        assert!(srt.contains("00:00:01,000 --> 00:00:02,000\nthere"));
    }

    fn workflow_with_policy(policy: MalformedPolicy) -> Workflow {
        let mut config = Config::default();
        config.captions.on_malformed = policy;
        Workflow::with_components(
            config,
            Box::new(MockTranscriberTrait::new()),
            Box::new(MockMediaProcessorTrait::new()),
        )
        .unwrap()
    }

    fn write_transcript_without_end(dir: &assert_fs::TempDir) -> PathBuf {
        let file = dir.child("transcript.json");
        file.write_str(
            r#"{"language":"en","segments":[
                {"start":0.0,"end":1.0,"text":"ok"},
                {"start":1.0,"text":"lost"},
                {"start":2.0,"end":3.0,"text":"fine"}
            ]}"#,
        )
        .unwrap();
        file.path().to_path_buf()
    }

    #[tokio::test]
    async fn test_caption_skips_segment_without_end() {
        let dir = assert_fs::TempDir::new().unwrap();
        let transcript_path = write_transcript_without_end(&dir);
        let srt_path = dir.path().join("captions.srt");

        let count = workflow_with_policy(MalformedPolicy::Skip)
            .caption_transcript(&transcript_path, &srt_path)
            .await
            .unwrap();

        assert_eq!(count, 2);
        let srt = std::fs::read_to_string(&srt_path).unwrap();
        assert!(srt.contains("ok") && srt.contains("fine"));
        assert!(!srt.contains("lost"));
    }

    #[tokio::test]
    async fn test_caption_aborts_on_segment_without_end() {
        let dir = assert_fs::TempDir::new().unwrap();
        let transcript_path = write_transcript_without_end(&dir);
        let srt_path = dir.path().join("captions.srt");

        let err = workflow_with_policy(MalformedPolicy::Abort)
            .caption_transcript(&transcript_path, &srt_path)
            .await
            .unwrap_err();

        match err {
            SubburnError::MalformedSegment(reason) => assert_eq!(reason, "segment 1: missing end"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!srt_path.exists());
    }

    #[tokio::test]
    async fn test_embed_requires_subtitle_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let video = dir.child("clip.mp4");
        video.write_binary(b"video").unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().never();
        let workflow = Workflow::with_components(
            Config::default(),
            Box::new(MockTranscriberTrait::new()),
            Box::new(media),
        )
        .unwrap();

        let missing = dir.path().join("missing.srt");
        let out = dir.path().join("out.mp4");
        let err = workflow
            .embed_subtitles(video.path(), missing.as_path(), out.as_path())
            .await
            .unwrap_err();
        assert!(matches!(err, SubburnError::FileNotFound(_)));
    }
}
