//! Build → select → adapt → execute.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use qrun_compile::{CompiledCircuit, TranspileLayout, generate_preset_pass_manager};
use qrun_hal::{
    BackendDescriptor, BackendFilter, EstimatorOptions, EstimatorPub, EstimatorPubResult,
    HalError, JobId, PrimitiveRequest, PrimitiveResult, QuantumService, SamplerOptions,
    SamplerPub, SamplerPubResult, WaitPolicy,
};
use qrun_ir::{Circuit, Observable, z_ladder_labels};
use tracing::{info, instrument};

use crate::circuits::{bell_circuit, grover_circuit};
use crate::config::{ServiceConfig, device_filter};
use crate::error::{PipelineError, PipelineResult};
use crate::mode::ExecutionMode;
use crate::present::{print_circuit, print_info, print_result};

/// Optimization level used by every program.
pub const OPTIMIZATION_LEVEL: u8 = 1;

/// Observables of the Bell program.
pub const BELL_LABELS: [&str; 6] = ["IZ", "IX", "ZI", "XI", "ZZ", "XX"];

/// `n` cumulative Z-string labels: `"ZI…I"`, `"ZZI…I"`, …, `"Z…Z"`.
pub fn observable_labels(n: usize) -> Vec<String> {
    z_ladder_labels(n)
}

/// Compile `circuit` for `backend`.
pub fn adapt(circuit: &Circuit, backend: &BackendDescriptor) -> PipelineResult<CompiledCircuit> {
    let manager = generate_preset_pass_manager(&backend.to_target(), OPTIMIZATION_LEVEL);
    Ok(manager.run(circuit)?)
}

/// Parse `labels` and move them onto the physical qubits of `layout`.
pub fn adapt_observables(
    labels: &[String],
    layout: &TranspileLayout,
) -> PipelineResult<Vec<Observable>> {
    let physical = layout.num_physical_qubits() as usize;
    labels
        .iter()
        .map(|label| -> PipelineResult<Observable> {
            let obs: Observable = label.parse()?;
            Ok(obs.apply_layout(layout.final_index_layout(), physical)?)
        })
        .collect()
}

/// Submits one pub at a time and waits for it.
pub struct ExecutionClient {
    service: Arc<dyn QuantumService>,
    wait_policy: WaitPolicy,
    estimator_options: EstimatorOptions,
    sampler_options: SamplerOptions,
}

impl ExecutionClient {
    /// Wrap `service` with the program defaults.
    pub fn new(service: Arc<dyn QuantumService>) -> Self {
        Self {
            service,
            wait_policy: WaitPolicy::unbounded(),
            estimator_options: EstimatorOptions::default(),
            sampler_options: SamplerOptions::default(),
        }
    }

    /// Replace the wait policy.
    #[must_use]
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    /// The wrapped service.
    pub fn service(&self) -> &Arc<dyn QuantumService> {
        &self.service
    }

    /// The named device, or the least busy one matching `filter`.
    pub async fn select_backend(
        &self,
        filter: &BackendFilter,
        name: Option<&str>,
    ) -> PipelineResult<BackendDescriptor> {
        let Some(name) = name else {
            return Ok(self.service.least_busy(filter).await?);
        };
        self.service
            .backends()
            .await?
            .into_iter()
            .find(|b| b.name == name)
            .ok_or_else(|| HalError::BackendUnavailable(name.to_string()).into())
    }

    /// Estimate `observables` on `circuit`.
    pub async fn run_estimator(
        &self,
        backend: &str,
        circuit: Circuit,
        observables: Vec<Observable>,
    ) -> PipelineResult<(JobId, EstimatorPubResult)> {
        let request = PrimitiveRequest::Estimator {
            pubs: vec![EstimatorPub::new(circuit, observables)],
            options: self.estimator_options,
        };
        let (job, result) = self.execute(backend, request).await?;
        let pub_result = result.into_estimator()?.into_iter().next().ok_or_else(|| {
            PipelineError::UnexpectedResult(format!("job {job} returned no pub results"))
        })?;
        Ok((job, pub_result))
    }

    /// Sample `circuit`.
    pub async fn run_sampler(
        &self,
        backend: &str,
        circuit: Circuit,
    ) -> PipelineResult<(JobId, SamplerPubResult)> {
        let request = PrimitiveRequest::Sampler {
            pubs: vec![SamplerPub::new(circuit)],
            options: self.sampler_options,
        };
        let (job, result) = self.execute(backend, request).await?;
        let pub_result = result.into_sampler()?.into_iter().next().ok_or_else(|| {
            PipelineError::UnexpectedResult(format!("job {job} returned no pub results"))
        })?;
        Ok((job, pub_result))
    }

    #[instrument(skip(self, request), fields(program = request.program_id()))]
    async fn execute(
        &self,
        backend: &str,
        request: PrimitiveRequest,
    ) -> PipelineResult<(JobId, PrimitiveResult)> {
        let job = self.service.submit(backend, request).await?;
        println!(">>> Job ID: {job}");

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Waiting for job {job} on {backend}..."));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.service.wait(&job, &self.wait_policy).await;
        spinner.finish_and_clear();
        info!(job = %job, ok = result.is_ok(), "job finished");
        Ok((job, result?))
    }
}

/// What a program produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Expectation values, one per label.
    Estimator {
        /// Logical observable labels.
        labels: Vec<String>,
        /// Values and standard deviations.
        result: EstimatorPubResult,
    },
    /// Measurement counts.
    Sampler(SamplerPubResult),
}

/// Record of one program run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Oracle expression, for Grover programs.
    pub expression: Option<String>,
    /// Logical circuit width.
    pub num_qubits: usize,
    /// Device the job ran on.
    pub backend: String,
    /// The job.
    pub job_id: JobId,
    /// Results.
    pub outcome: Outcome,
}

/// The full program pipeline over one service.
pub struct Pipeline {
    client: ExecutionClient,
    backend: Option<String>,
    allow_simulator: bool,
}

impl Pipeline {
    /// Pipeline over `service`, selecting the least busy hardware device.
    pub fn new(service: Arc<dyn QuantumService>) -> Self {
        Self {
            client: ExecutionClient::new(service),
            backend: None,
            allow_simulator: false,
        }
    }

    /// Pipeline over `service` with the device selection of `config`.
    pub fn from_config(service: Arc<dyn QuantumService>, config: &ServiceConfig) -> Self {
        Self::new(service)
            .with_backend(config.backend.clone())
            .allow_simulator(config.allow_simulator)
    }

    /// Always run on `name`.
    #[must_use]
    pub fn with_backend(mut self, name: Option<String>) -> Self {
        self.backend = name;
        self
    }

    /// Let least-busy selection pick simulators.
    #[must_use]
    pub fn allow_simulator(mut self, allow: bool) -> Self {
        self.allow_simulator = allow;
        self
    }

    /// Replace the wait policy.
    #[must_use]
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.client = self.client.with_wait_policy(policy);
        self
    }

    /// The execution client.
    pub fn client(&self) -> &ExecutionClient {
        &self.client
    }

    /// Bell state, six two-qubit Pauli expectation values.
    pub async fn run_bell(&self) -> PipelineResult<Report> {
        let circuit = bell_circuit()?;
        let labels = BELL_LABELS.iter().map(ToString::to_string).collect();
        self.run(circuit, ExecutionMode::Estimator, labels, None).await
    }

    /// Grover search for `secret`.
    ///
    /// The secret is validated before any service call.
    pub async fn run_grover(&self, secret: &str, mode: ExecutionMode) -> PipelineResult<Report> {
        let program = grover_circuit(secret, mode)?;
        print_result("Oracle expression", &program.expression);
        print_result("Grover iterations", program.iterations);
        let labels = observable_labels(program.circuit.num_qubits());
        self.run(program.circuit, mode, labels, Some(program.expression))
            .await
    }

    async fn run(
        &self,
        circuit: Circuit,
        mode: ExecutionMode,
        labels: Vec<String>,
        expression: Option<String>,
    ) -> PipelineResult<Report> {
        let num_qubits = circuit.num_qubits();
        print_circuit("Logical circuit", &circuit);

        #[allow(clippy::cast_possible_truncation)]
        let filter = device_filter(num_qubits as u32, self.allow_simulator);
        let device = self
            .client
            .select_backend(&filter, self.backend.as_deref())
            .await?;
        print_result("Backend", format!("{} ({} pending jobs)", device.name, device.pending_jobs));

        let compiled = adapt(&circuit, &device)?;
        print_circuit("Adapted circuit", &compiled.circuit);

        print_info(&format!("Submitting {mode} job to {}", device.name));
        let (job_id, outcome) = match mode {
            ExecutionMode::Estimator => {
                let observables = adapt_observables(&labels, &compiled.layout)?;
                let (job, result) = self
                    .client
                    .run_estimator(&device.name, compiled.circuit, observables)
                    .await?;
                (job, Outcome::Estimator { labels, result })
            }
            ExecutionMode::Sampler => {
                let (job, result) = self.client.run_sampler(&device.name, compiled.circuit).await?;
                (job, Outcome::Sampler(result))
            }
        };

        Ok(Report {
            expression,
            num_qubits,
            backend: device.name,
            job_id,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observable_labels() {
        assert_eq!(observable_labels(2), ["ZI", "ZZ"]);
        assert_eq!(observable_labels(3), ["ZII", "ZZI", "ZZZ"]);
        assert!(observable_labels(0).is_empty());
    }

    #[test]
    fn test_adapt_observables_uses_final_layout() {
        let layout = TranspileLayout::new(vec![0, 1], vec![2, 0], 3);
        let labels = vec!["IZ".to_string(), "XI".to_string()];
        let adapted = adapt_observables(&labels, &layout).unwrap();
        // Virtual 0 ends on physical 2, virtual 1 on physical 0.
        assert_eq!(adapted[0].label(), "ZII");
        assert_eq!(adapted[1].label(), "IIX");
    }
}
