// Bounded status polling for dubbing jobs

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::PollConfig;
use crate::console::Console;
use crate::dubbing::{DubbingService, JobStatus};
use crate::error::DubError;

/// Suspends the poll loop between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper for the binary
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How a poll loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Complete { attempts: u32 },
    /// Terminal job state, unparseable reply, or a rejected status request
    Failed { status: Option<JobStatus>, reason: Option<String> },
    TimedOut { attempts: u32 },
}

pub struct Poller<'a> {
    service: &'a dyn DubbingService,
    sleeper: &'a dyn Sleeper,
    console: &'a Console,
    interval: Duration,
    max_attempts: u32,
}

impl<'a> Poller<'a> {
    pub fn new(
        service: &'a dyn DubbingService,
        sleeper: &'a dyn Sleeper,
        console: &'a Console,
        config: &PollConfig,
    ) -> Self {
        Self {
            service,
            sleeper,
            console,
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts,
        }
    }

    /// Poll until the job completes, fails, or the attempt budget runs out.
    ///
    /// Only an in-progress reply leads to another attempt. Any error while
    /// querying, including a non-success HTTP status, ends the loop.
    pub async fn wait_for_completion(&self, job_id: &str) -> PollOutcome {
        for attempt in 1..=self.max_attempts {
            let report = match self.service.status(job_id).await {
                Ok(report) => report,
                Err(DubError::Remote { status, body }) => {
                    self.console.line(format!("Error checking status: {}", status));
                    self.console.line(format!("Response: {}", body));
                    warn!("Status request for {} rejected with {}", job_id, status);
                    return PollOutcome::Failed {
                        status: None,
                        reason: Some(format!("HTTP {}: {}", status, body)),
                    };
                }
                Err(e) => {
                    self.console.line(format!("Error checking status: {}", e));
                    warn!("Status request for {} failed: {}", job_id, e);
                    return PollOutcome::Failed {
                        status: None,
                        reason: Some(e.to_string()),
                    };
                }
            };

            self.console.line(format!("Attempt {}: Status = {}", attempt, report.status));
            debug!(job_id, attempt, status = %report.status, "Polled dubbing status");

            match report.status {
                JobStatus::Complete => return PollOutcome::Complete { attempts: attempt },
                JobStatus::InProgress => {
                    self.console.line(format!(
                        "Still processing... Will check again in {} seconds.",
                        self.interval.as_secs()
                    ));
                    self.sleeper.sleep(self.interval).await;
                }
                status => {
                    self.console.line(format!("Dubbing failed with status: {}", status));
                    if let Some(message) = &report.error_message {
                        self.console.line(format!("Error: {}", message));
                    }
                    return PollOutcome::Failed {
                        status: Some(status),
                        reason: report.error_message,
                    };
                }
            }
        }

        PollOutcome::TimedOut { attempts: self.max_attempts }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::console::Captured;
    use crate::dubbing::{MockDubbingService, StatusReport};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records requested sleeps instead of waiting.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        pub sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    pub(crate) fn report(status: &str) -> StatusReport {
        StatusReport {
            http_status: 200,
            status: JobStatus::from_wire(status),
            error_message: None,
            raw: format!(r#"{{"status":"{}"}}"#, status),
        }
    }

    fn config(max_attempts: u32) -> PollConfig {
        PollConfig { interval_secs: 10, max_attempts }
    }

    /// In-progress for the first `k` queries, complete afterwards.
    fn complete_after(service: &mut MockDubbingService, k: u32) -> Arc<AtomicU32> {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        service
            .expect_status()
            .returning(move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Ok(report(if n < k { "dubbing" } else { "dubbed" }))
            });
        calls
    }

    #[tokio::test]
    async fn complete_on_first_poll_queries_once() {
        let mut service = MockDubbingService::new();
        let calls = complete_after(&mut service, 0);
        let sleeper = RecordingSleeper::default();
        let captured = Captured::default();
        let console = captured.console();

        let outcome = Poller::new(&service, &sleeper, &console, &config(120))
            .wait_for_completion("job1")
            .await;

        assert_eq!(outcome, PollOutcome::Complete { attempts: 1 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sleeps_once_per_in_progress_reply() {
        let mut service = MockDubbingService::new();
        let calls = complete_after(&mut service, 4);
        let sleeper = RecordingSleeper::default();
        let captured = Captured::default();
        let console = captured.console();

        let outcome = Poller::new(&service, &sleeper, &console, &config(120))
            .wait_for_completion("job1")
            .await;

        assert_eq!(outcome, PollOutcome::Complete { attempts: 5 });
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(*sleeper.sleeps.lock().unwrap(), vec![Duration::from_secs(10); 4]);
        assert!(captured.text().contains("Attempt 5: Status = dubbed"));
    }

    #[tokio::test]
    async fn gives_up_after_attempt_ceiling() {
        let mut service = MockDubbingService::new();
        service
            .expect_status()
            .times(7)
            .returning(|_| Ok(report("dubbing")));
        let sleeper = RecordingSleeper::default();
        let captured = Captured::default();
        let console = captured.console();

        let outcome = Poller::new(&service, &sleeper, &console, &config(7))
            .wait_for_completion("job1")
            .await;

        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 7 });
        assert_eq!(sleeper.sleeps.lock().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn failed_status_stops_immediately() {
        let mut service = MockDubbingService::new();
        service.expect_status().times(1).returning(|_| {
            Ok(StatusReport {
                http_status: 200,
                status: JobStatus::Failed,
                error_message: Some("no speech detected".to_string()),
                raw: String::new(),
            })
        });
        let sleeper = RecordingSleeper::default();
        let captured = Captured::default();
        let console = captured.console();

        let outcome = Poller::new(&service, &sleeper, &console, &config(120))
            .wait_for_completion("job1")
            .await;

        assert_eq!(
            outcome,
            PollOutcome::Failed {
                status: Some(JobStatus::Failed),
                reason: Some("no speech detected".to_string()),
            }
        );
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
        assert!(captured.text().contains("Error: no speech detected"));
    }

    #[tokio::test]
    async fn unrecognized_status_stops_immediately() {
        let mut service = MockDubbingService::new();
        service.expect_status().times(1).returning(|_| Ok(report("cloning")));
        let sleeper = RecordingSleeper::default();
        let captured = Captured::default();
        let console = captured.console();

        let outcome = Poller::new(&service, &sleeper, &console, &config(120))
            .wait_for_completion("job1")
            .await;

        assert!(matches!(
            outcome,
            PollOutcome::Failed { status: Some(JobStatus::Unknown(ref s)), .. } if s == "cloning"
        ));
    }

    #[tokio::test]
    async fn rejected_status_request_is_not_retried() {
        let mut service = MockDubbingService::new();
        service.expect_status().times(1).returning(|_| {
            Err(DubError::Remote {
                status: 503,
                body: "unavailable".to_string(),
            })
        });
        let sleeper = RecordingSleeper::default();
        let captured = Captured::default();
        let console = captured.console();

        let outcome = Poller::new(&service, &sleeper, &console, &config(120))
            .wait_for_completion("job1")
            .await;

        assert!(matches!(outcome, PollOutcome::Failed { status: None, .. }));
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
    }
}
