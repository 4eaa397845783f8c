use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{DubError, Result};

/// Environment variable holding the dubbing API key.
pub const API_KEY_ENV: &str = "ELEVEN_API_KEY";

fn default_watermark() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub poll: PollConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the dubbing service
    pub base_url: String,
    /// Language of the uploaded audio
    pub source_lang: String,
    /// Language to dub into when `--target-lang` is not given
    pub target_lang: String,
    /// Ask the service to watermark the output
    #[serde(default = "default_watermark")]
    pub watermark: bool,
    /// Per-request timeout; unset keeps the HTTP client's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to wait between status checks
    pub interval_secs: u64,
    /// Status checks before giving up
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory for YouTube downloads and dubbed results
    pub output_dir: PathBuf,
    /// Video submitted when neither an input file nor a URL is given
    pub fallback_input: PathBuf,
    /// Path to the yt-dlp binary
    pub ytdlp_binary: String,
    /// yt-dlp format selector
    pub ytdlp_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://api.elevenlabs.io".to_string(),
                source_lang: "en".to_string(),
                target_lang: "ru".to_string(),
                watermark: true,
                request_timeout_secs: None,
            },
            poll: PollConfig {
                interval_secs: 10,
                max_attempts: 120,
            },
            download: DownloadConfig {
                output_dir: PathBuf::from("downloads"),
                fallback_input: PathBuf::from("input.mov"),
                ytdlp_binary: "yt-dlp".to_string(),
                ytdlp_format: "mp4/bestvideo+bestaudio/best".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Secret credentials, kept out of the TOML file.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DubError::Config(format!("Missing {} in .env", API_KEY_ENV)));
        }
        Ok(Self { api_key })
    }

    /// Read the API key from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let key = std::env::var(API_KEY_ENV).unwrap_or_default();
        Self::new(key)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("api_key", &"<redacted>").finish()
    }
}
