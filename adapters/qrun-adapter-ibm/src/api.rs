//! IBM Quantum Runtime REST client.
//!
//! Covers the parts of the Cloud API the pipeline needs:
//! - IAM token exchange for API keys
//! - Listing backends with configuration and queue status
//! - Submitting estimator and sampler V2 jobs
//! - Polling job status, fetching results and cancelling

use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::config::{IbmConfig, IbmCredentials};
use crate::error::{IbmError, IbmResult};

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests.
const USER_AGENT: &str = concat!("qrun/", env!("CARGO_PKG_VERSION"));

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

impl IbmClient {
    /// Build a client, exchanging an API key for a bearer token first when
    /// the config carries one.
    #[instrument(skip_all, fields(endpoint = %config.endpoint))]
    pub async fn connect(config: &IbmConfig) -> IbmResult<Self> {
        let bearer = match &config.credentials {
            IbmCredentials::ApiKey { api_key, .. } => {
                debug!("exchanging API key for IAM token");
                exchange_api_key(config, api_key).await?
            }
            IbmCredentials::Token { token, .. } => token.clone(),
        };
        Self::with_bearer(config, &bearer)
    }

    /// Build a client around an already issued bearer token.
    pub fn with_bearer(config: &IbmConfig, bearer: &str) -> IbmResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {bearer}"))
                .map_err(|_| IbmError::InvalidToken)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(crn) = config.credentials.service_crn() {
            headers.insert(
                header::HeaderName::from_static("service-crn"),
                header::HeaderValue::from_str(crn).map_err(|_| IbmError::MissingServiceCrn)?,
            );
        }
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The API base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List every backend with its configuration and status.
    ///
    /// Devices whose details cannot be fetched are skipped. If every
    /// device fails, the last error is returned.
    #[instrument(skip(self))]
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let devices: DevicesResponse = check(self.client.get(&url).send().await?)
            .await?
            .json()
            .await?;

        let mut backends = Vec::with_capacity(devices.devices.len());
        let mut last_error = None;
        for device in &devices.devices {
            match self.get_backend(&device.name).await {
                Ok(info) => backends.push(info),
                Err(e) => {
                    warn!(backend = %device.name, error = %e, "skipping backend");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if backends.is_empty() => Err(e),
            _ => Ok(backends),
        }
    }

    /// Fetch `/configuration` and `/status` for one backend.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        let config_url = format!("{}/v1/backends/{name}/configuration", self.endpoint);
        let response = self.client.get(&config_url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        let config: BackendConfigResponse = check(response).await?.json().await?;

        let status_url = format!("{}/v1/backends/{name}/status", self.endpoint);
        let response = self.client.get(&status_url).send().await?;
        let status: BackendStatusResponse = check(response).await?.json().await?;

        Ok(BackendInfo {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            basis_gates: config.basis_gates,
            coupling_map: config.coupling_map.unwrap_or_default(),
            simulator: config.simulator.unwrap_or(false),
            operational: status.state,
            status_msg: (!status.status.is_empty()).then_some(status.status),
            pending_jobs: status.length_queue,
        })
    }

    /// Submit a primitive job.
    #[instrument(skip(self, request), fields(program = %request.program_id, backend = %request.backend))]
    pub async fn submit_job(&self, request: &JobRequest) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let response = self.client.post(&url).json(request).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Get job status.
    pub async fn job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{job_id}", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        Ok(check(response).await?.json().await?)
    }

    /// Get job results.
    pub async fn job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{job_id}/results", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        Ok(check(response).await?.json().await?)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{job_id}/cancel", self.endpoint);
        let response = self.client.post(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        check(response).await?;
        Ok(())
    }
}

async fn exchange_api_key(config: &IbmConfig, api_key: &str) -> IbmResult<String> {
    let iam_client = Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()?;

    let response = iam_client
        .post(&config.iam_url)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, "application/json")
        .body(format!(
            "grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={api_key}"
        ))
        .send()
        .await
        .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "no body".to_string());
        return Err(IbmError::IamTokenExchange(format!(
            "IAM returned {status}: {body}"
        )));
    }

    let token: IamTokenResponse = response
        .json()
        .await
        .map_err(|e| IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}")))?;
    Ok(token.access_token)
}

/// Turn a non-success response into [`IbmError::Api`].
async fn check(response: Response) -> IbmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|e| e.message())
        .unwrap_or(body);
    Err(IbmError::Api {
        status: status.as_u16(),
        message,
    })
}

// ============================================================================
// Request types
// ============================================================================

/// Body of `POST /v1/jobs`.
#[derive(Debug, Serialize)]
pub struct JobRequest {
    /// `estimator` or `sampler`.
    pub program_id: String,
    /// Backend name.
    pub backend: String,
    /// Primitive parameters.
    pub params: serde_json::Value,
}

// ============================================================================
// Response types
// ============================================================================

/// API error body.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    message: String,
}

impl ApiErrorResponse {
    fn message(self) -> Option<String> {
        self.message
            .or_else(|| self.errors.into_iter().next().map(|e| e.message))
    }
}

/// Device list (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

/// `/backends/{name}/configuration`.
#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: u32,
    #[serde(default)]
    basis_gates: Vec<String>,
    #[serde(default)]
    coupling_map: Option<Vec<[u32; 2]>>,
    #[serde(default)]
    simulator: Option<bool>,
}

/// `/backends/{name}/status`.
#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    length_queue: u32,
}

/// Merged configuration and status of one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Native gates.
    pub basis_gates: Vec<String>,
    /// Directed coupling edges.
    pub coupling_map: Vec<[u32; 2]>,
    /// Whether this is a simulator.
    pub simulator: bool,
    /// Whether the backend accepts jobs.
    pub operational: bool,
    /// Status text.
    pub status_msg: Option<String>,
    /// Queue length.
    pub pending_jobs: u32,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Status, mixed case on the Cloud API.
    pub status: String,
    /// State object with failure reason.
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job state with reason.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Check if job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Check if job failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    /// Check if job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Failure reason, if the service gave one.
    pub fn error_message(&self) -> Option<String> {
        self.state.as_ref().and_then(|s| s.reason.clone())
    }
}

/// Job results: one entry per pub.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// Pub results in submission order.
    pub results: Vec<PubResultResponse>,
}

/// Result data of a single pub.
///
/// Estimator pubs carry `evs` and `stds` arrays; sampler pubs carry one
/// entry per classical register with hex-encoded `samples`.
#[derive(Debug, Deserialize)]
pub struct PubResultResponse {
    /// Data fields keyed by name.
    pub data: HashMap<String, serde_json::Value>,
    /// Execution metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
