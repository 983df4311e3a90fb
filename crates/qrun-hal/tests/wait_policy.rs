//! Polling behaviour of the provided `wait` and `least_busy` methods.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use qrun_hal::{
    BackendDescriptor, BackendFilter, Counts, HalError, HalResult, JobId, JobStatus,
    PrimitiveRequest, PrimitiveResult, QuantumService, SamplerPubResult, WaitPolicy,
};

/// Replays a fixed status sequence, repeating the last entry.
struct Scripted {
    statuses: Mutex<Vec<JobStatus>>,
    polls: Mutex<usize>,
}

impl Scripted {
    fn new(mut statuses: Vec<JobStatus>) -> Self {
        statuses.reverse();
        Self {
            statuses: Mutex::new(statuses),
            polls: Mutex::new(0),
        }
    }

    fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl QuantumService for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn backends(&self) -> HalResult<Vec<BackendDescriptor>> {
        Ok(["fake_b", "fake_a"]
            .into_iter()
            .map(|name| BackendDescriptor {
                name: name.into(),
                num_qubits: 5,
                simulator: false,
                operational: true,
                pending_jobs: 2,
                basis_gates: vec![],
                coupling_map: vec![],
                status_msg: None,
            })
            .collect())
    }

    async fn submit(&self, _backend: &str, _request: PrimitiveRequest) -> HalResult<JobId> {
        Ok(JobId::new("job-1"))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        *self.polls.lock().unwrap() += 1;
        let mut statuses = self.statuses.lock().unwrap();
        Ok(if statuses.len() > 1 {
            statuses.pop().unwrap()
        } else {
            statuses[0].clone()
        })
    }

    async fn result(&self, _job_id: &JobId) -> HalResult<PrimitiveResult> {
        Ok(PrimitiveResult::Sampler(vec![SamplerPubResult {
            counts: Counts::from_pairs([("0", 4)]),
            shots: 4,
        }]))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

fn fast() -> WaitPolicy {
    WaitPolicy::unbounded().with_poll_interval(Duration::from_millis(1))
}

#[tokio::test]
async fn wait_polls_until_completed() {
    let service = Scripted::new(vec![
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Completed,
    ]);
    let result = service.wait(&JobId::new("job-1"), &fast()).await.unwrap();
    assert_eq!(service.polls(), 3);
    assert_eq!(result.into_sampler().unwrap()[0].counts.total_shots(), 4);
}

#[tokio::test]
async fn failed_and_cancelled_jobs_are_errors() {
    let failed = Scripted::new(vec![JobStatus::Running, JobStatus::Failed("boom".into())]);
    let err = failed.wait(&JobId::new("j"), &fast()).await.unwrap_err();
    assert!(matches!(err, HalError::JobFailed(msg) if msg == "boom"));

    let cancelled = Scripted::new(vec![JobStatus::Cancelled]);
    let err = cancelled.wait(&JobId::new("j"), &fast()).await.unwrap_err();
    assert!(matches!(err, HalError::JobCancelled));
}

#[tokio::test(start_paused = true)]
async fn timeout_is_opt_in() {
    let service = Scripted::new(vec![JobStatus::Queued]);
    let policy = WaitPolicy::unbounded()
        .with_poll_interval(Duration::from_secs(10))
        .with_timeout(Duration::from_secs(60));

    let err = service.wait(&JobId::new("slow"), &policy).await.unwrap_err();
    assert!(matches!(err, HalError::Timeout(id) if id == "slow"));
    assert!(service.polls() >= 6);
    assert_eq!(WaitPolicy::default().timeout, None);
}

#[tokio::test]
async fn least_busy_uses_listing() {
    let service = Scripted::new(vec![JobStatus::Queued]);
    let chosen = service.least_busy(&BackendFilter::hardware()).await.unwrap();
    assert_eq!(chosen.name, "fake_a");

    let none = service
        .least_busy(&BackendFilter::hardware().with_min_qubits(100))
        .await;
    assert!(matches!(none, Err(HalError::NoBackendAvailable(_))));
}
