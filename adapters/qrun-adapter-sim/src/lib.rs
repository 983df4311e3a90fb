//! qrun Local Statevector Simulator
//!
//! An in-process [`QuantumService`](qrun_hal::QuantumService) for tests,
//! demos and offline runs. It exposes a handful of fake devices with
//! IBM-style native gates and coupling maps, plus an ideal
//! `statevector_simulator` device, and runs both primitives:
//!
//! - **Sampler**: samples the final state; seed it with
//!   [`SimulatorService::with_seed`] for reproducible counts.
//! - **Estimator**: exact expectation values, with the standard deviation
//!   a shot-based estimate would have, `sqrt((1 - ev²) / shots)`.
//!
//! Hardware devices reject circuits that are not already transpiled for
//! them, so the compile pipeline is exercised end to end.
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//!
//! # Example
//!
//! ```ignore
//! use qrun_adapter_sim::SimulatorService;
//! use qrun_hal::{PrimitiveRequest, QuantumService, SamplerPub, WaitPolicy};
//! use qrun_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = SimulatorService::new().with_seed(7);
//!     let mut circuit = Circuit::bell()?;
//!     circuit.measure_all()?;
//!
//!     let request = PrimitiveRequest::sampler(SamplerPub::new(circuit));
//!     let job = service.submit("statevector_simulator", request).await?;
//!     let result = service.wait(&job, &WaitPolicy::default()).await?;
//!     println!("{:?}", result.into_sampler()?[0].counts.sorted());
//!     Ok(())
//! }
//! ```

pub mod devices;
mod service;
mod statevector;

pub use devices::fake_devices;
pub use service::{MAX_QUBITS, SimulatorService};
pub use statevector::Statevector;
