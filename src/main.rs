//! Subburn - transcribe a video and burn the captions into it
//!
//! Entry point for the command line tool. Audio extraction and burn-in run
//! through ffmpeg, transcription through whisper.cpp or openai-whisper.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use subburn::cli::{Args, Commands};
use subburn::config::{Config, ModelSize};
use subburn::setup::ModelManager;
use subburn::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Subburn");

    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Process { input, output, model, language, font, keep_srt } => {
            apply_overrides(&mut config, model, language, font);

            let workflow = Workflow::new(config)?;
            workflow.check_dependencies().await?;
            let options = workflow.transcribe_options();

            let output = workflow
                .process_video(&input, output.as_deref(), &options, keep_srt)
                .await?;
            println!("Subtitled video written to {}", output.display());
        }
        Commands::Batch { input_dir, output_dir, model, language, font } => {
            apply_overrides(&mut config, model, language, font);

            let workflow = Workflow::new(config)?;
            workflow.check_dependencies().await?;
            let options = workflow.transcribe_options();

            let outputs = workflow
                .process_directory(&input_dir, output_dir.as_deref(), &options)
                .await?;
            println!("Processed {} videos", outputs.len());
            for output in outputs {
                println!("  {}", output.display());
            }
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let workflow = Workflow::new(config)?;
            workflow.extract_audio(&input, &output).await?;
        }
        Commands::Transcribe { input, output, model, language } => {
            info!("Transcribing audio: {}", input.display());
            apply_overrides(&mut config, model, language, None);

            let workflow = Workflow::new(config)?;
            let options = workflow.transcribe_options();
            let transcript = workflow.transcribe_audio(&input, &output, &options).await?;
            println!(
                "Wrote {} segments to {}",
                transcript.segments.len(),
                output.display()
            );
            println!("{}", transcript.text());
        }
        Commands::Caption { input, output, max_chars, max_lines } => {
            if let Some(max_chars) = max_chars {
                config.captions.max_chars = max_chars;
            }
            if let Some(max_lines) = max_lines {
                config.captions.max_lines = max_lines;
            }
            config.captions.validate()?;

            let workflow = Workflow::new(config)?;
            let count = workflow.caption_transcript(&input, &output).await?;
            println!("Wrote {} captions to {}", count, output.display());
        }
        Commands::Embed { video, subtitles, output, font } => {
            info!("Embedding subtitles into video: {}", video.display());
            apply_overrides(&mut config, None, None, font);

            let workflow = Workflow::new(config)?;
            workflow.embed_subtitles(&video, &subtitles, &output).await?;
        }
        Commands::Models { download } => {
            let manager = ModelManager::new(&config.transcriber.models_dir)?;
            let models = manager.list_models();

            println!("\nWhisper.cpp models in {}:", manager.models_dir().display());
            println!("{:<10} {:<22} {:<10} {:<10}", "Name", "Filename", "Size (MB)", "Status");
            println!("{}", "-".repeat(55));
            for model in &models {
                let status = if model.present { "Downloaded" } else { "Missing" };
                println!(
                    "{:<10} {:<22} {:<10.1} {:<10}",
                    model.info.size.to_string(),
                    model.info.filename,
                    model.info.size_mb,
                    status
                );
            }

            if download {
                info!("Downloading all missing models...");
                for model in models.iter().filter(|model| !model.present) {
                    manager.download_model(&model.info).await?;
                }
                info!("All models downloaded successfully");
            }
        }
        Commands::InitConfig { output } => {
            if output.exists() {
                anyhow::bail!("{} already exists", output.display());
            }
            config.save_to_file(&output)?;
            println!("Wrote configuration to {}", output.display());
        }
    }

    info!("Subburn completed successfully");
    Ok(())
}

/// `--config` if given, else `./config.toml` if present, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    Ok(config)
}

fn apply_overrides(
    config: &mut Config,
    model: Option<ModelSize>,
    language: Option<String>,
    font: Option<PathBuf>,
) {
    if let Some(model) = model {
        config.transcriber.model = model;
    }
    if language.is_some() {
        config.transcriber.language = language;
    }
    if font.is_some() {
        config.media.font_file = font;
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subburn").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subburn.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("subburn.log").display()
    );

    Ok(())
}
