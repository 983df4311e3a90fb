//! Quantum service abstraction for qrun.
//!
//! Programs talk to execution providers only through the
//! [`QuantumService`] trait: list devices, pick the least busy one,
//! submit an estimator or sampler [`PrimitiveRequest`], then wait for the
//! [`PrimitiveResult`].
//!
//! | Provider | Crate |
//! |----------|-------|
//! | Local statevector simulator | `qrun-adapter-sim` |
//! | IBM Quantum Runtime | `qrun-adapter-ibm` |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qrun_hal::{BackendFilter, EstimatorPub, PrimitiveRequest, QuantumService, WaitPolicy};
//!
//! async fn run(service: Arc<dyn QuantumService>, pub_: EstimatorPub) -> qrun_hal::HalResult<()> {
//!     let device = service.least_busy(&BackendFilter::hardware()).await?;
//!     let job = service.submit(&device.name, PrimitiveRequest::estimator(pub_)).await?;
//!     let result = service.wait(&job, &WaitPolicy::unbounded()).await?;
//!     println!("{:?}", result.into_estimator()?);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod primitive;
pub mod result;
pub mod service;

pub use backend::{BackendDescriptor, BackendFilter, least_busy};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use primitive::{EstimatorOptions, EstimatorPub, PrimitiveRequest, SamplerOptions, SamplerPub};
pub use result::{Counts, EstimatorPubResult, PrimitiveResult, SamplerPubResult};
pub use service::{QuantumService, WaitPolicy};
