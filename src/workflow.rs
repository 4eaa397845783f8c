use std::path::PathBuf;
use tracing::{info, warn};

use crate::cli::Action;
use crate::config::{Config, Credentials};
use crate::console::Console;
use crate::dubbing::elevenlabs::ElevenLabsClient;
use crate::dubbing::{DubbingService, Job, StatusReport};
use crate::error::{DubError, Result};
use crate::fetch::fetch_dubbed;
use crate::media::MediaFile;
use crate::poll::{PollOutcome, Poller, Sleeper, TokioSleeper};
use crate::source::{resolve_input, InputSource, VideoDownloader, YtDlpDownloader};

const PROGRAM: &str = env!("CARGO_PKG_NAME");

/// Runs one invocation: resolve input, submit, poll, fetch.
///
/// Only configuration problems (a missing input file) come back as `Err`.
/// Remote failures are printed and yield `Ok(None)`.
pub struct Workflow {
    config: Config,
    service: Box<dyn DubbingService>,
    downloader: Box<dyn VideoDownloader>,
    sleeper: Box<dyn Sleeper>,
    console: Console,
}

impl Workflow {
    pub fn new(config: Config, credentials: Credentials) -> Result<Self> {
        let service = ElevenLabsClient::new(&config.api, credentials)?;
        let downloader = YtDlpDownloader::new(&config.download);

        Ok(Self::with_parts(
            config,
            Box::new(service),
            Box::new(downloader),
            Box::new(TokioSleeper),
        ))
    }

    /// Assemble a workflow printing to stdout.
    pub fn with_parts(
        config: Config,
        service: Box<dyn DubbingService>,
        downloader: Box<dyn VideoDownloader>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            service,
            downloader,
            sleeper,
            console: Console::stdout(),
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub async fn run(&self, action: Action, target_lang: &str) -> Result<()> {
        match action {
            Action::Check(job_id) => {
                self.check_status(&job_id).await?;
            }
            Action::Download(job_id) => {
                self.console.line(format!("Downloading dubbing ID: {}", job_id));
                if let Some(path) = self.download(&job_id, target_lang).await? {
                    self.console.line(format!("Downloaded: {}", path.display()));
                }
            }
            Action::WaitAndDownload(job_id) => {
                self.wait_and_download(&job_id, target_lang).await?;
            }
            Action::Youtube(url) => {
                self.dub_from_url(&url, target_lang).await?;
            }
            Action::Submit(path) => {
                let source = path.map(InputSource::File).unwrap_or(InputSource::Fallback);
                if let Some(job) = self.submit(&source, target_lang).await? {
                    self.print_follow_up(&job);
                }
            }
        }
        Ok(())
    }

    /// Print the remote status of an existing job.
    pub async fn check_status(&self, job_id: &str) -> Result<Option<StatusReport>> {
        self.console.line(format!("Checking status for dubbing ID: {}", job_id));
        match self.service.status(job_id).await {
            Ok(report) => {
                self.console.line(format!("Status: {}", report.http_status));
                self.console.line(format!("Dubbing Status: {}", report.status));
                if let Some(message) = &report.error_message {
                    self.console.line(format!("Error: {}", message));
                }
                self.console.line(format!("Full Response: {}", report.raw));
                Ok(Some(report))
            }
            Err(e) => {
                self.report_failure("Error checking status", &e);
                Ok(None)
            }
        }
    }

    /// Save the output of a job assumed complete.
    pub async fn download(&self, job_id: &str, target_lang: &str) -> Result<Option<PathBuf>> {
        match fetch_dubbed(self.service.as_ref(), job_id, target_lang, &self.config.download.output_dir).await {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                self.report_failure("Error downloading file", &e);
                Ok(None)
            }
        }
    }

    /// Poll an existing job until it finishes, then save its output.
    pub async fn wait_and_download(&self, job_id: &str, target_lang: &str) -> Result<Option<PathBuf>> {
        self.console.line(format!("Waiting for dubbing {} to complete...", job_id));

        let poller = Poller::new(
            self.service.as_ref(),
            self.sleeper.as_ref(),
            &self.console,
            &self.config.poll,
        );
        match poller.wait_for_completion(job_id).await {
            PollOutcome::Complete { attempts } => {
                info!("Dubbing {} completed after {} checks", job_id, attempts);
                self.console.line("Dubbing completed! Downloading file...");
                match self.download(job_id, target_lang).await? {
                    Some(path) => {
                        self.console.line(format!(
                            "Dubbing {} downloaded successfully: {}",
                            job_id,
                            path.display()
                        ));
                        Ok(Some(path))
                    }
                    None => {
                        self.console.line("Failed to download file");
                        Ok(None)
                    }
                }
            }
            PollOutcome::Failed { status, reason } => {
                warn!(
                    "Dubbing {} did not complete (status: {:?}, reason: {:?})",
                    job_id, status, reason
                );
                Ok(None)
            }
            PollOutcome::TimedOut { attempts } => {
                warn!("Dubbing {} still running after {} checks", job_id, attempts);
                self.console.line("Dubbing timed out");
                Ok(None)
            }
        }
    }

    /// Resolve the input and start a dubbing job for it.
    pub async fn submit(&self, source: &InputSource, target_lang: &str) -> Result<Option<Job>> {
        let path = match resolve_input(source, &self.config.download, self.downloader.as_ref()).await {
            Ok(path) => path,
            Err(DubError::DownloadFailed(reason)) => {
                self.console.line(format!("Error downloading video: {}", reason));
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let video = MediaFile::new(path);
        self.console.line("Sending video to ElevenLabs for dubbing...");
        match self.service.submit(&video, target_lang).await {
            Ok(job) => {
                info!(
                    "Dubbing {} ({}) started for {}",
                    job.job_id,
                    job.status,
                    video.path.display()
                );
                Ok(Some(job))
            }
            Err(e) => {
                self.report_failure("Error starting dubbing", &e);
                Ok(None)
            }
        }
    }

    /// Download a web video, dub it, and fetch the result.
    pub async fn dub_from_url(&self, url: &str, target_lang: &str) -> Result<Option<PathBuf>> {
        let Some(job) = self.submit(&InputSource::Url(url.to_string()), target_lang).await? else {
            return Ok(None);
        };
        self.console.line(format!("Dubbing started with ID: {}", job.job_id));
        self.wait_and_download(&job.job_id, &job.target_language).await
    }

    fn report_failure(&self, context: &str, error: &DubError) {
        match error {
            DubError::Remote { status, body } => {
                self.console.line(format!("{}: {}", context, status));
                self.console.line(format!("Response: {}", body));
            }
            other => self.console.line(format!("{}: {}", context, other)),
        }
        warn!("{}: {}", context, error);
    }

    fn print_follow_up(&self, job: &Job) {
        let out = &self.console;
        out.line("\nDubbing started successfully!");
        out.line(format!("Dubbing ID: {}", job.job_id));
        match job.expected_duration_seconds {
            Some(secs) => out.line(format!("Expected duration: {:.1} seconds", secs)),
            None => out.line("Expected duration: unknown"),
        }
        out.line("\nTo check status, run:");
        out.line(format!("   {} --check-dubbing={}", PROGRAM, job.job_id));
        out.line("\nTo download when ready, run:");
        out.line(format!(
            "   {} --download-dubbing={} --target-lang={}",
            PROGRAM, job.job_id, job.target_language
        ));
        out.line("\nOr wait and auto-download, run:");
        out.line(format!(
            "   {} --wait-and-download={} --target-lang={}",
            PROGRAM, job.job_id, job.target_language
        ));
    }
}
