// Input resolution: turn CLI input into a local video file

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::DownloadConfig;
use crate::error::{DubError, Result};

/// Where the video to dub comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Url(String),
    /// The configured fallback file
    Fallback,
}

/// Fetches a web video to local disk.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Download `url` into `output_dir` and return the local file path.
    /// Every failure is reported as `DubError::DownloadFailed`.
    async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// `VideoDownloader` backed by the yt-dlp executable
pub struct YtDlpDownloader {
    binary_path: String,
    format: String,
}

impl YtDlpDownloader {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            binary_path: config.ytdlp_binary.clone(),
            format: config.ytdlp_format.clone(),
        }
    }
}

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| DubError::DownloadFailed(format!("Cannot create {}: {}", output_dir.display(), e)))?;

        info!("Downloading video from {}", url);

        let template = output_dir.join("%(id)s.%(ext)s");
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("-f").arg(&self.format)
           .arg("-o").arg(&template)
           .arg("--no-playlist")
           .arg("--print").arg("after_move:filepath")
           .arg("--no-simulate")
           .arg(url);

        debug!("Executing yt-dlp command: {:?}", cmd);

        let output = cmd.output()
            .await
            .map_err(|e| DubError::DownloadFailed(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubError::DownloadFailed(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = downloaded_path(&stdout)
            .ok_or_else(|| DubError::DownloadFailed("yt-dlp did not report a file path".to_string()))?;

        if !path.exists() {
            return Err(DubError::DownloadFailed(format!(
                "yt-dlp reported {} but the file does not exist",
                path.display()
            )));
        }

        info!("Video downloaded to {}", path.display());
        Ok(path)
    }
}

/// Last non-empty line of yt-dlp's `--print after_move:filepath` output.
fn downloaded_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

/// Check that a local file exists before anything touches the network.
pub fn require_existing(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(DubError::FileNotFound(path.display().to_string()))
    }
}

/// Resolve an input source to a readable local video path.
pub async fn resolve_input(
    source: &InputSource,
    config: &DownloadConfig,
    downloader: &dyn VideoDownloader,
) -> Result<PathBuf> {
    match source {
        InputSource::File(path) => require_existing(path),
        InputSource::Fallback => {
            debug!("No input given, using fallback {}", config.fallback_input.display());
            require_existing(&config.fallback_input)
        }
        InputSource::Url(url) => downloader.download(url, &config.output_dir).await,
    }
}
