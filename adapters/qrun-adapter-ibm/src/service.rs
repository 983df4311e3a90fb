//! [`QuantumService`] over the IBM Quantum Runtime.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{info, instrument};

use qrun_hal::{
    BackendDescriptor, HalError, HalResult, JobId, JobStatus, PrimitiveRequest, PrimitiveResult,
    QuantumService,
};

use crate::api::{BackendInfo, IbmClient, JobRequest, JobResultResponse, JobStatusResponse};
use crate::config::IbmConfig;
use crate::error::IbmResult;
use crate::payload::{
    RegisterShape, decode_estimator, decode_sampler, estimator_params, sampler_params,
    sampler_registers,
};

/// What this process knows about a job it submitted.
#[derive(Debug, Clone)]
enum Submitted {
    Estimator,
    Sampler(Vec<RegisterShape>),
}

/// IBM Quantum Runtime service.
#[derive(Debug)]
pub struct IbmService {
    client: IbmClient,
    jobs: Mutex<FxHashMap<String, Submitted>>,
}

impl IbmService {
    /// Authenticate and build the service.
    pub async fn connect(config: &IbmConfig) -> IbmResult<Self> {
        Ok(Self::from_client(IbmClient::connect(config).await?))
    }

    /// Wrap an existing client.
    pub fn from_client(client: IbmClient) -> Self {
        Self {
            client,
            jobs: Mutex::new(FxHashMap::default()),
        }
    }

    /// The underlying REST client.
    pub fn client(&self) -> &IbmClient {
        &self.client
    }

    fn submitted(&self, job_id: &JobId) -> Option<Submitted> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&job_id.0)
            .cloned()
    }
}

impl From<BackendInfo> for BackendDescriptor {
    fn from(info: BackendInfo) -> Self {
        Self {
            name: info.name,
            num_qubits: info.num_qubits,
            simulator: info.simulator,
            operational: info.operational,
            pending_jobs: info.pending_jobs,
            basis_gates: info.basis_gates,
            coupling_map: info.coupling_map,
            status_msg: info.status_msg,
        }
    }
}

/// Map a Runtime job status onto [`JobStatus`].
pub fn map_status(status: &JobStatusResponse) -> JobStatus {
    match status.status.to_uppercase().as_str() {
        "QUEUED" => JobStatus::Queued,
        "COMPLETED" => JobStatus::Completed,
        "FAILED" | "ERROR" => JobStatus::Failed(
            status
                .error_message()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        "CANCELLED" => JobStatus::Cancelled,
        // VALIDATING, RUNNING and anything new
        _ => JobStatus::Running,
    }
}

fn decode(results: &JobResultResponse, submitted: Option<Submitted>) -> IbmResult<PrimitiveResult> {
    let submitted = submitted.unwrap_or_else(|| {
        let is_estimator = results
            .results
            .first()
            .is_some_and(|r| r.data.contains_key("evs"));
        if is_estimator {
            Submitted::Estimator
        } else {
            Submitted::Sampler(Vec::new())
        }
    });
    Ok(match submitted {
        Submitted::Estimator => PrimitiveResult::Estimator(decode_estimator(results)?),
        Submitted::Sampler(registers) if registers.is_empty() => {
            PrimitiveResult::Sampler(decode_sampler(results, None)?)
        }
        Submitted::Sampler(registers) => {
            PrimitiveResult::Sampler(decode_sampler(results, Some(&registers))?)
        }
    })
}

#[async_trait]
impl QuantumService for IbmService {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ibm"
    }

    async fn backends(&self) -> HalResult<Vec<BackendDescriptor>> {
        let backends = self.client.list_backends().await?;
        Ok(backends.into_iter().map(BackendDescriptor::from).collect())
    }

    #[instrument(skip(self, request), fields(program = request.program_id()))]
    async fn submit(&self, backend: &str, request: PrimitiveRequest) -> HalResult<JobId> {
        request.validate()?;
        let (params, submitted) = match &request {
            PrimitiveRequest::Estimator { pubs, options } => {
                (estimator_params(pubs, options)?, Submitted::Estimator)
            }
            PrimitiveRequest::Sampler { pubs, options } => (
                sampler_params(pubs, options)?,
                Submitted::Sampler(sampler_registers(pubs)),
            ),
        };

        let body = JobRequest {
            program_id: request.program_id().to_string(),
            backend: backend.to_string(),
            params,
        };
        let response = self
            .client
            .submit_job(&body)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        info!(job = %response.id, backend, pubs = request.num_pubs(), "submitted job");
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(response.id.clone(), submitted);
        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.job_status(&job_id.0).await?;
        Ok(map_status(&status))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<PrimitiveResult> {
        let status = self.client.job_status(&job_id.0).await?;
        match map_status(&status) {
            JobStatus::Completed => {}
            JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
            JobStatus::Cancelled => return Err(HalError::JobCancelled),
            other => {
                return Err(HalError::Backend(format!(
                    "Job {job_id} not yet completed ({other})"
                )));
            }
        }

        let results = self.client.job_results(&job_id.0).await?;
        Ok(decode(&results, self.submitted(job_id))?)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        Ok(())
    }
}
