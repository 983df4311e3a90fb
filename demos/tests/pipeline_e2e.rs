//! Program pipeline against a recording service double.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use qrun_adapter_sim::{SimulatorService, devices::fake_manila};
use qrun_demos::{ExecutionMode, Outcome, Pipeline, PipelineError, PipelineResult, Report};
use qrun_hal::{
    BackendDescriptor, Counts, EstimatorPubResult, HalError, HalResult, JobId, JobStatus,
    PrimitiveRequest, PrimitiveResult, QuantumService, SamplerPubResult,
};

/// Answers every job at once with zeros and records what was submitted.
#[derive(Default)]
struct MockService {
    calls: AtomicUsize,
    submitted: Mutex<Vec<(String, PrimitiveRequest)>>,
    results: Mutex<Vec<PrimitiveResult>>,
}

impl MockService {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn submitted(&self) -> Vec<(String, PrimitiveRequest)> {
        self.submitted.lock().unwrap().clone()
    }

    fn job_index(job_id: &JobId) -> HalResult<usize> {
        job_id
            .0
            .strip_prefix("mock-")
            .and_then(|k| k.parse().ok())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    fn answer(request: &PrimitiveRequest) -> PrimitiveResult {
        match request {
            PrimitiveRequest::Estimator { pubs, .. } => PrimitiveResult::Estimator(
                pubs.iter()
                    .map(|p| EstimatorPubResult {
                        evs: vec![0.0; p.observables.len()],
                        stds: vec![0.0; p.observables.len()],
                    })
                    .collect(),
            ),
            PrimitiveRequest::Sampler { pubs, options } => PrimitiveResult::Sampler(
                pubs.iter()
                    .map(|p| {
                        let shots = p.shots.unwrap_or(options.default_shots);
                        let zeros = "0".repeat(p.circuit.num_clbits());
                        SamplerPubResult {
                            counts: Counts::from_pairs([(zeros, u64::from(shots))]),
                            shots,
                        }
                    })
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl QuantumService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn backends(&self) -> HalResult<Vec<BackendDescriptor>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![fake_manila()])
    }

    async fn submit(&self, backend: &str, request: PrimitiveRequest) -> HalResult<JobId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        request.validate()?;
        let mut results = self.results.lock().unwrap();
        results.push(Self::answer(&request));
        self.submitted
            .lock()
            .unwrap()
            .push((backend.to_string(), request));
        Ok(JobId::from(format!("mock-{}", results.len() - 1)))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Self::job_index(job_id)?;
        Ok(JobStatus::Completed)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<PrimitiveResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let k = Self::job_index(job_id)?;
        self.results
            .lock()
            .unwrap()
            .get(k)
            .cloned()
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn pipeline(mock: &Arc<MockService>) -> Pipeline {
    Pipeline::new(mock.clone())
}

/// Parse the mode the way the binaries do, then run.
async fn run_from_input(pipeline: &Pipeline, secret: &str, mode: &str) -> PipelineResult<Report> {
    let mode: ExecutionMode = mode.parse()?;
    pipeline.run_grover(secret, mode).await
}

#[tokio::test]
async fn grover_estimator_bundles_observables_in_one_job() {
    let mock = Arc::new(MockService::default());
    let report = pipeline(&mock).run_grover("11", ExecutionMode::Estimator).await.unwrap();

    assert_eq!(report.num_qubits, 2);
    assert_eq!(report.expression.as_deref(), Some("x0 & x1"));
    assert_eq!(report.backend, "fake_manila");
    let Outcome::Estimator { labels, result } = &report.outcome else {
        panic!("expected estimator outcome");
    };
    assert_eq!(labels, &["ZI", "ZZ"]);
    assert_eq!(result.evs.len(), 2);

    let submitted = mock.submitted();
    assert_eq!(submitted.len(), 1);
    let (backend, PrimitiveRequest::Estimator { pubs, options }) = &submitted[0] else {
        panic!("expected an estimator job");
    };
    assert_eq!(backend, "fake_manila");
    assert_eq!(options.default_shots, 5000);
    assert_eq!(options.resilience_level, 1);
    assert_eq!(pubs.len(), 1);

    let observables: Vec<String> = pubs[0].observables.iter().map(|o| o.label()).collect();
    // Trivial layout: logical qubits 0 and 1 stay put on the 5-qubit device.
    assert_eq!(observables, ["IIIZI", "IIIZZ"]);
    assert!(pubs[0].circuit.instructions().all(|i| !i.is_measure()));
}

#[tokio::test]
async fn grover_sampler_measures_every_qubit() {
    let mock = Arc::new(MockService::default());
    let report = pipeline(&mock).run_grover("00", ExecutionMode::Sampler).await.unwrap();

    assert_eq!(report.num_qubits, 2);
    assert_eq!(report.expression.as_deref(), Some("~x0 & ~x1"));
    let Outcome::Sampler(result) = &report.outcome else {
        panic!("expected sampler outcome");
    };
    assert_eq!(result.shots, 1024);
    assert_eq!(result.counts.total_shots(), 1024);

    let submitted = mock.submitted();
    assert_eq!(submitted.len(), 1);
    let (_, PrimitiveRequest::Sampler { pubs, options }) = &submitted[0] else {
        panic!("expected a sampler job");
    };
    assert_eq!(options.default_shots, 1024);
    assert_eq!(pubs.len(), 1);
    assert_eq!(pubs[0].circuit.num_clbits(), 2);
    assert!(pubs[0].circuit.has_terminal_measurement());
}

#[tokio::test]
async fn invalid_mode_makes_no_service_calls() {
    let mock = Arc::new(MockService::default());
    let err = run_from_input(&pipeline(&mock), "11", "both")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidMode(ref m) if m == "both"));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn mode_is_case_and_whitespace_insensitive() {
    let mock = Arc::new(MockService::default());
    let mode: ExecutionMode = "  SAMPLER ".parse().unwrap();
    assert_eq!(mode, ExecutionMode::Sampler);
    let report = pipeline(&mock).run_grover("1", mode).await.unwrap();
    assert!(matches!(report.outcome, Outcome::Sampler(_)));
}

#[tokio::test]
async fn invalid_secret_is_rejected_before_submission() {
    let mock = Arc::new(MockService::default());
    let err = pipeline(&mock).run_grover("1a", ExecutionMode::Sampler).await.unwrap_err();

    assert!(matches!(err, PipelineError::Oracle(_)));
    assert!(mock.submitted().is_empty());
}

#[tokio::test]
async fn identical_inputs_submit_identical_circuits() {
    let first = Arc::new(MockService::default());
    let second = Arc::new(MockService::default());
    pipeline(&first).run_grover("101", ExecutionMode::Sampler).await.unwrap();
    pipeline(&second).run_grover("101", ExecutionMode::Sampler).await.unwrap();

    let circuit = |mock: &MockService| match &mock.submitted()[0].1 {
        PrimitiveRequest::Sampler { pubs, .. } => {
            pubs[0].circuit.instructions().cloned().collect::<Vec<_>>()
        }
        PrimitiveRequest::Estimator { .. } => panic!("expected a sampler job"),
    };
    assert_eq!(circuit(&first), circuit(&second));
}

#[tokio::test]
async fn backend_override_must_exist() {
    let mock = Arc::new(MockService::default());
    let err = pipeline(&mock)
        .with_backend(Some("ibm_nowhere".into()))
        .run_bell()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Hal(HalError::BackendUnavailable(ref name)) if name == "ibm_nowhere"
    ));
    assert!(mock.submitted().is_empty());
}

#[tokio::test]
async fn bell_program_on_simulator() {
    let service = Arc::new(SimulatorService::new().with_seed(7));
    let report = Pipeline::new(service).run_bell().await.unwrap();

    let Outcome::Estimator { labels, result } = report.outcome else {
        panic!("expected estimator outcome");
    };
    assert_eq!(labels, ["IZ", "IX", "ZI", "XI", "ZZ", "XX"]);
    let expected = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0];
    for (ev, want) in result.evs.iter().zip(expected) {
        assert!((ev - want).abs() < 1e-9, "{ev} != {want}");
    }
}

#[tokio::test]
async fn grover_sampler_on_simulator_finds_secret() {
    let service = Arc::new(SimulatorService::new().with_seed(11));
    let report = Pipeline::new(service).run_grover("00", ExecutionMode::Sampler).await.unwrap();

    let Outcome::Sampler(result) = report.outcome else {
        panic!("expected sampler outcome");
    };
    assert_eq!(result.counts.total_shots(), 1024);
    // One iteration on two qubits finds the secret with certainty.
    assert_eq!(result.counts.get("00"), 1024);
}
