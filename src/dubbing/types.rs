use serde::Deserialize;

use crate::error::Result;

/// Lifecycle state reported by the dubbing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// `"dubbing"`
    InProgress,
    /// `"dubbed"`
    Complete,
    /// `"failed"`
    Failed,
    Unknown(String),
}

impl JobStatus {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "dubbing" => Self::InProgress,
            "dubbed" => Self::Complete,
            "failed" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "dubbing",
            Self::Complete => "dubbed",
            Self::Failed => "failed",
            Self::Unknown(s) => s,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dubbing task as known to this invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub job_id: String,
    pub target_language: String,
    pub status: JobStatus,
    pub expected_duration_seconds: Option<f64>,
}

/// Body of a successful create-job response
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub dubbing_id: String,
    #[serde(default)]
    pub expected_duration_sec: Option<f64>,
}

impl SubmitResponse {
    pub fn into_job(self, target_language: &str) -> Job {
        Job {
            job_id: self.dubbing_id,
            target_language: target_language.to_string(),
            status: JobStatus::InProgress,
            expected_duration_seconds: self.expected_duration_sec,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Parsed status response, keeping the raw body for display.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// HTTP status code of the status reply
    pub http_status: u16,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub raw: String,
}

impl StatusReport {
    /// A missing `status` field reads as `"unknown"`.
    pub fn parse(http_status: u16, body: &str) -> Result<Self> {
        let response: StatusResponse = serde_json::from_str(body)?;
        let status = response.status.as_deref().unwrap_or("unknown");
        Ok(Self {
            http_status,
            status: JobStatus::from_wire(status),
            error_message: response.error_message,
            raw: body.to_string(),
        })
    }
}
