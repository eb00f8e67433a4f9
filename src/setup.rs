use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use reqwest::Client;
use tracing::info;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ModelSize;
use crate::error::{Result, SubburnError};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub size: ModelSize,
    pub filename: String,
    pub url: String,
    pub size_mb: f64,
}

impl ModelInfo {
    pub fn for_size(size: ModelSize) -> Self {
        let (name, size_mb) = match size {
            ModelSize::Tiny => ("tiny", 75.0),
            ModelSize::Base => ("base", 142.0),
            ModelSize::Small => ("small", 466.0),
            ModelSize::Medium => ("medium", 1500.0),
            ModelSize::Large => ("large-v3", 2900.0),
        };
        let filename = format!("ggml-{}.bin", name);
        Self {
            size,
            url: format!("{}/{}", MODEL_BASE_URL, filename),
            filename,
            size_mb,
        }
    }
}

/// Local status of one whisper.cpp model
#[derive(Debug, Clone)]
pub struct ModelStatus {
    pub info: ModelInfo,
    pub path: PathBuf,
    pub present: bool,
}

/// Locates and downloads whisper.cpp ggml models
pub struct ModelManager {
    client: Client,
    models_dir: PathBuf,
}

impl ModelManager {
    pub fn new<P: AsRef<Path>>(models_dir: P) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("subburn/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            models_dir: models_dir.as_ref().to_path_buf(),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Where the model for `size` lives, whether or not it exists yet
    pub fn model_path(&self, size: ModelSize) -> PathBuf {
        self.models_dir.join(ModelInfo::for_size(size).filename)
    }

    pub fn list_models(&self) -> Vec<ModelStatus> {
        ModelSize::ALL
            .iter()
            .map(|&size| {
                let path = self.model_path(size);
                ModelStatus {
                    info: ModelInfo::for_size(size),
                    present: path.exists(),
                    path,
                }
            })
            .collect()
    }

    /// Local path of the model, downloading it first if it is missing
    pub async fn ensure_model(&self, size: ModelSize) -> Result<PathBuf> {
        let local_path = self.model_path(size);
        if local_path.exists() {
            info!("Model {} already exists at {}", size, local_path.display());
            return Ok(local_path);
        }

        self.download_model(&ModelInfo::for_size(size)).await
    }

    pub async fn download_model(&self, model: &ModelInfo) -> Result<PathBuf> {
        let local_path = self.models_dir.join(&model.filename);

        if local_path.exists() {
            info!("Model {} already exists at {}", model.size, local_path.display());
            return Ok(local_path);
        }

        async_fs::create_dir_all(&self.models_dir).await?;

        info!("Downloading {} model ({:.1} MB)...", model.size, model.size_mb);

        let mut response = self.client.get(&model.url).send().await?;

        if !response.status().is_success() {
            return Err(SubburnError::Download(format!(
                "Failed to download model {}: HTTP {}",
                model.size,
                response.status()
            )));
        }

        let total = response
            .content_length()
            .unwrap_or((model.size_mb * 1_000_000.0) as u64);
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .map_err(|e| SubburnError::Download(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-");
        pb.set_style(style);

        // Stream into a temporary file so an interrupted download never looks complete
        let temp_path = local_path.with_extension("tmp");
        let mut file = async_fs::File::create(&temp_path).await?;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }

        file.flush().await?;
        drop(file);

        async_fs::rename(&temp_path, &local_path).await?;

        pb.finish_with_message(format!("Downloaded {}", model.size));
        info!("Successfully downloaded {} to {}", model.size, local_path.display());

        Ok(local_path)
    }
}
