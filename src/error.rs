use thiserror::Error;

#[derive(Error, Debug)]
pub enum DubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Video download failed: {0}")]
    DownloadFailed(String),

    /// The dubbing service answered with a non-success HTTP status.
    #[error("Remote service returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Failed to save dubbed file: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, DubError>;
