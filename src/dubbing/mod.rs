// Remote dubbing service abstraction
//
// The workflow only talks to `DubbingService`; the HTTP implementation lives in
// `elevenlabs`. Tests substitute a mock so polling and orchestration run
// without network access.

pub mod elevenlabs;
pub mod types;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;

pub use types::*;
use crate::error::Result;
use crate::media::MediaFile;

/// Chunks of a dubbed media body as they arrive.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A dubbed file ready to be streamed to disk.
pub struct DubbedMedia {
    /// Body length when the service reports it
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

/// Capabilities the workflow needs from the dubbing service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DubbingService: Send + Sync {
    /// Upload a video and start dubbing it into `target_lang`
    async fn submit(&self, video: &MediaFile, target_lang: &str) -> Result<Job>;

    /// Query the current status of a job
    async fn status(&self, job_id: &str) -> Result<StatusReport>;

    /// Open the dubbed output of a completed job
    async fn download(&self, job_id: &str, target_lang: &str) -> Result<DubbedMedia>;
}
