//! IBM Quantum Runtime service for qrun.
//!
//! Implements [`QuantumService`](qrun_hal::QuantumService) against the IBM
//! Quantum Cloud REST API. Circuits must already be compiled for the chosen
//! device; they are sent as OpenQASM 3 inside estimator or sampler V2 pubs.
//!
//! # Authentication
//!
//! | Variables | Flow |
//! |-----------|------|
//! | `IBM_API_KEY` + `IBM_SERVICE_CRN` | API key exchanged for an IAM bearer token |
//! | `IBM_QUANTUM_TOKEN` | Bearer token used directly |
//!
//! `IBM_ENDPOINT` overrides the API base URL.
//!
//! # Example
//!
//! ```ignore
//! use qrun_adapter_ibm::{IbmConfig, IbmService};
//! use qrun_hal::{BackendFilter, QuantumService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = IbmService::connect(&IbmConfig::from_env()?).await?;
//!     let device = service.least_busy(&BackendFilter::hardware()).await?;
//!     println!("{} ({} pending)", device.name, device.pending_jobs);
//!     Ok(())
//! }
//! ```

mod api;
mod config;
mod error;
mod payload;
mod service;

pub use api::{BackendInfo, IbmClient, JobRequest, JobResultResponse, JobStatusResponse};
pub use config::{DEFAULT_ENDPOINT, IAM_TOKEN_URL, IbmConfig, IbmCredentials};
pub use error::{IbmError, IbmResult};
pub use payload::RegisterShape;
pub use service::{IbmService, map_status};
