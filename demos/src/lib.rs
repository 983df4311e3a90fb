//! qrun demo programs
//!
//! Two programs share one pipeline:
//!
//! - **Bell**: prepares `|Φ+⟩` and estimates six two-qubit Pauli
//!   observables.
//! - **Grover**: builds a phase oracle that marks a secret bitstring and
//!   runs the optimal number of Grover iterations, in sampler or estimator
//!   mode.
//!
//! ```text
//!   circuit ──→ select device ──→ adapt (layout, basis) ──→ submit ──→ present
//! ```
//!
//! Execution goes through [`qrun_hal::QuantumService`], so the same
//! pipeline drives the local simulator, IBM Quantum, or a test double:
//!
//! ```ignore
//! use qrun_demos::{ExecutionMode, Pipeline, ServiceConfig};
//!
//! let config = ServiceConfig::default();
//! let pipeline = Pipeline::from_config(config.connect().await?, &config);
//! let report = pipeline.run_grover("101", ExecutionMode::Sampler).await?;
//! qrun_demos::present::print_report(&report);
//! ```

pub mod circuits;
pub mod config;
pub mod error;
pub mod mode;
pub mod pipeline;
pub mod present;

pub use config::{ServiceConfig, ServiceKind};
pub use error::{PipelineError, PipelineResult};
pub use mode::ExecutionMode;
pub use pipeline::{ExecutionClient, Outcome, Pipeline, Report, observable_labels};
