//! The service trait every execution provider implements.
//!
//! ```text
//!   backends() ──→ least_busy() ──→ submit() ──→ status() ──→ result()
//!                                      │            ▲
//!                                      └── wait() ──┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::backend::{BackendDescriptor, BackendFilter, least_busy};
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::primitive::PrimitiveRequest;
use crate::result::PrimitiveResult;

/// How [`QuantumService::wait`] polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between status checks.
    pub poll_interval: Duration,
    /// Give up after this long; `None` waits forever.
    pub timeout: Option<Duration>,
}

impl WaitPolicy {
    /// Poll every second with no deadline. Hardware queues can take hours.
    pub fn unbounded() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: None,
        }
    }

    /// Set the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set a deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A provider of quantum devices and primitive execution.
///
/// Implementations must be `Send + Sync` so one instance can be shared as
/// `Arc<dyn QuantumService>`.
#[async_trait]
pub trait QuantumService: Send + Sync {
    /// Provider name, e.g. `ibm_quantum` or `local_sim`.
    fn name(&self) -> &str;

    /// List every device visible to the caller.
    async fn backends(&self) -> HalResult<Vec<BackendDescriptor>>;

    /// Submit a primitive job to `backend`. The job starts `Queued`.
    async fn submit(&self, backend: &str, request: PrimitiveRequest) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Fetch the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<PrimitiveResult>;

    /// Cancel a job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Poll until the job is terminal, then fetch its result.
    ///
    /// Failed and cancelled jobs become [`HalError::JobFailed`] and
    /// [`HalError::JobCancelled`].
    async fn wait(&self, job_id: &JobId, policy: &WaitPolicy) -> HalResult<PrimitiveResult> {
        let started = Instant::now();
        let mut polls = 0u64;
        loop {
            let status = self.status(job_id).await?;
            polls += 1;
            debug!(job = %job_id, %status, polls, "polled job");

            match status {
                JobStatus::Completed => {
                    info!(job = %job_id, elapsed = ?started.elapsed(), "job completed");
                    return self.result(job_id).await;
                }
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {}
            }

            if let Some(limit) = policy.timeout {
                if started.elapsed() >= limit {
                    return Err(HalError::Timeout(job_id.0.clone()));
                }
            }
            sleep(policy.poll_interval).await;
        }
    }

    /// List devices once and pick the least busy match.
    async fn least_busy(&self, filter: &BackendFilter) -> HalResult<BackendDescriptor> {
        least_busy(self.backends().await?, filter)
    }
}
