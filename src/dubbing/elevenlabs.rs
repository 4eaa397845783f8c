// ElevenLabs dubbing API client

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, info};

use super::{DubbedMedia, DubbingService, Job, StatusReport, SubmitResponse};
use crate::config::{ApiConfig, Credentials};
use crate::error::{DubError, Result};
use crate::media::MediaFile;

const API_KEY_HEADER: &str = "xi-api-key";

pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    source_lang: String,
    watermark: bool,
}

impl ElevenLabsClient {
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("dubber/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            source_lang: config.source_lang.clone(),
            watermark: config.watermark,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/dubbing{}", self.base_url, path)
    }

    /// Turn a non-success response into `DubError::Remote` with its body.
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DubError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DubbingService for ElevenLabsClient {
    async fn submit(&self, video: &MediaFile, target_lang: &str) -> Result<Job> {
        let data = tokio::fs::read(&video.path).await?;
        info!(
            "Uploading {} ({} bytes, {}) for dubbing {} -> {}",
            video.path.display(),
            data.len(),
            video.content_type,
            self.source_lang,
            target_lang
        );

        let part = Part::bytes(data)
            .file_name(video.file_name())
            .mime_str(video.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("source_lang", self.source_lang.clone())
            .text("target_lang", target_lang.to_string())
            .text("watermark", self.watermark.to_string());

        let response = self.client
            .post(self.url(""))
            .header(API_KEY_HEADER, self.credentials.api_key())
            .multipart(form)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let body = response.text().await?;
        debug!("Create dubbing response: {}", body);
        let submitted: SubmitResponse = serde_json::from_str(&body)?;
        Ok(submitted.into_job(target_lang))
    }

    async fn status(&self, job_id: &str) -> Result<StatusReport> {
        let response = self.client
            .get(self.url(&format!("/{}", job_id)))
            .header(API_KEY_HEADER, self.credentials.api_key())
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let http_status = response.status().as_u16();

        let body = response.text().await?;
        debug!("Status response for {}: {}", job_id, body);
        StatusReport::parse(http_status, &body)
    }

    async fn download(&self, job_id: &str, target_lang: &str) -> Result<DubbedMedia> {
        let response = self.client
            .get(self.url(&format!("/{}/audio/{}", job_id, target_lang)))
            .header(API_KEY_HEADER, self.credentials.api_key())
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DubError::from));

        Ok(DubbedMedia {
            content_length,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dubbing::JobStatus;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ElevenLabsClient {
        let mut config = Config::default().api;
        config.base_url = server.base_url();
        ElevenLabsClient::new(&config, Credentials::new("test-key").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn submit_uploads_multipart_with_content_type() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/dubbing")
                    .header("xi-api-key", "test-key")
                    .body_contains("filename=\"talk.mov\"")
                    .body_contains("video/quicktime")
                    .body_contains("name=\"target_lang\"")
                    .body_contains("name=\"watermark\"");
                then.status(200)
                    .json_body(json!({"dubbing_id": "dub1", "expected_duration_sec": 12.5}));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.mov");
        std::fs::write(&path, b"fake video").unwrap();

        let job = client_for(&server)
            .submit(&MediaFile::new(&path), "de")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(job.job_id, "dub1");
        assert_eq!(job.target_language, "de");
        assert_eq!(job.expected_duration_seconds, Some(12.5));
    }

    #[tokio::test]
    async fn submit_surfaces_rejection_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/dubbing");
                then.status(422).body("invalid target_lang");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"fake video").unwrap();

        let err = client_for(&server)
            .submit(&MediaFile::new(&path), "xx")
            .await
            .unwrap_err();

        match err {
            DubError::Remote { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "invalid target_lang");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn status_parses_job_state() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/dubbing/dub1")
                    .header("xi-api-key", "test-key");
                then.status(200).json_body(json!({"dubbing_id": "dub1", "status": "dubbing"}));
            })
            .await;

        let report = client_for(&server).status("dub1").await.unwrap();
        assert_eq!(report.http_status, 200);
        assert_eq!(report.status, JobStatus::InProgress);
        assert_eq!(report.error_message, None);
    }

    #[tokio::test]
    async fn status_non_success_is_remote_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/dubbing/missing");
                then.status(404).body("not found");
            })
            .await;

        let err = client_for(&server).status("missing").await.unwrap_err();
        assert!(matches!(err, DubError::Remote { status: 404, .. }));
    }

    #[tokio::test]
    async fn download_streams_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/dubbing/dub1/audio/ru");
                then.status(200).body("dubbed bytes");
            })
            .await;

        let media = client_for(&server).download("dub1", "ru").await.unwrap();
        assert_eq!(media.content_length, Some(12));

        let mut body = media.body;
        let mut collected = Vec::new();
        while let Some(chunk) = body.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"dubbed bytes");
    }
}
