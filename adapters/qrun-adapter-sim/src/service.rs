//! In-process quantum service backed by the statevector engine.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use qrun_hal::{
    BackendDescriptor, Counts, EstimatorOptions, EstimatorPub, EstimatorPubResult, HalError,
    HalResult, Job, JobId, JobStatus, PrimitiveRequest, PrimitiveResult, QuantumService,
    SamplerOptions, SamplerPub, SamplerPubResult,
};
use qrun_ir::Circuit;

use crate::devices::fake_devices;
use crate::statevector::Statevector;

/// Widest circuit the engine will allocate a statevector for.
pub const MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<PrimitiveResult>,
}

/// Local quantum service.
///
/// Jobs run to completion inside `submit`; `status` and `result` read the
/// stored outcome. Each device is checked the way a remote runtime would:
/// the circuit must fit, use only native gates and respect the coupling
/// map.
pub struct SimulatorService {
    devices: Vec<BackendDescriptor>,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    seed: Option<u64>,
    submitted: AtomicU64,
}

impl SimulatorService {
    /// Create a service exposing the default fake devices.
    pub fn new() -> Self {
        Self::with_devices(fake_devices())
    }

    /// Create a service exposing `devices`.
    pub fn with_devices(devices: Vec<BackendDescriptor>) -> Self {
        Self {
            devices,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed: None,
            submitted: AtomicU64::new(0),
        }
    }

    /// Make sampling reproducible. Job `k` uses `seed + k`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn device(&self, name: &str) -> HalResult<&BackendDescriptor> {
        let device = self
            .devices
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| HalError::BackendUnavailable(name.to_string()))?;
        if !device.operational {
            return Err(HalError::BackendUnavailable(format!(
                "{name} is not operational"
            )));
        }
        Ok(device)
    }

    fn rng(&self) -> StdRng {
        let k = self.submitted.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(k)),
            None => StdRng::from_entropy(),
        }
    }

    /// Run a request synchronously.
    #[instrument(skip_all, fields(backend = %device.name, program = request.program_id()))]
    fn execute(
        &self,
        device: &BackendDescriptor,
        request: &PrimitiveRequest,
        rng: &mut StdRng,
    ) -> HalResult<PrimitiveResult> {
        let start = Instant::now();
        let result = match request {
            PrimitiveRequest::Estimator { pubs, options } => PrimitiveResult::Estimator(
                pubs.iter()
                    .map(|p| run_estimator_pub(p, options))
                    .collect::<HalResult<_>>()?,
            ),
            PrimitiveRequest::Sampler { pubs, options } => PrimitiveResult::Sampler(
                pubs.iter()
                    .map(|p| run_sampler_pub(p, options, rng))
                    .collect::<HalResult<_>>()?,
            ),
        };
        debug!(elapsed = ?start.elapsed(), "simulation finished");
        Ok(result)
    }

    fn with_job<T>(&self, job_id: &JobId, f: impl FnOnce(&mut SimJob) -> T) -> HalResult<T> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get_mut(&job_id.0)
            .map(f)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }
}

impl Default for SimulatorService {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject circuits a device could not run as given.
fn check_executable(circuit: &Circuit, device: &BackendDescriptor) -> HalResult<()> {
    if circuit.num_qubits() > device.num_qubits as usize {
        return Err(HalError::CircuitTooLarge(format!(
            "circuit '{}' has {} qubits but {} has {}",
            circuit.name(),
            circuit.num_qubits(),
            device.name,
            device.num_qubits
        )));
    }
    if circuit.num_qubits() > MAX_QUBITS as usize {
        return Err(HalError::CircuitTooLarge(format!(
            "statevector simulation is limited to {MAX_QUBITS} qubits"
        )));
    }

    let basis: FxHashSet<&str> = device.basis_gates.iter().map(String::as_str).collect();
    let edges: FxHashSet<(u32, u32)> = device
        .coupling_map
        .iter()
        .flat_map(|[a, b]| [(*a, *b), (*b, *a)])
        .collect();

    for inst in circuit.instructions().filter(|i| i.is_gate()) {
        if !basis.is_empty() && !basis.contains(inst.name()) {
            return Err(HalError::InvalidCircuit(format!(
                "gate '{}' is not native to {}",
                inst.name(),
                device.name
            )));
        }
        if let &[a, b] = inst.qubits.as_slice() {
            if !edges.is_empty() && !edges.contains(&(a.0, b.0)) {
                return Err(HalError::InvalidCircuit(format!(
                    "'{}' on ({}, {}) is not an edge of {}",
                    inst.name(),
                    a.0,
                    b.0,
                    device.name
                )));
            }
        }
    }
    Ok(())
}

/// Clbit → qubit for every measurement, rejecting gates after a measure.
fn measurement_map(circuit: &Circuit) -> HalResult<Vec<Option<usize>>> {
    let mut map = vec![None; circuit.num_clbits()];
    let mut measured = vec![false; circuit.num_qubits()];
    for inst in circuit.instructions() {
        if inst.is_measure() {
            for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                map[c.index()] = Some(q.index());
                measured[q.index()] = true;
            }
        } else if !inst.is_barrier() && inst.qubits.iter().any(|q| measured[q.index()]) {
            return Err(HalError::Unsupported(format!(
                "'{}' after measurement in circuit '{}'",
                inst.name(),
                circuit.name()
            )));
        }
    }
    Ok(map)
}

/// Render a basis index as a bitstring over the classical bits, clbit 0
/// rightmost.
fn outcome_bitstring(outcome: usize, map: &[Option<usize>]) -> String {
    map.iter()
        .rev()
        .map(|q| match q {
            Some(q) if (outcome >> q) & 1 == 1 => '1',
            _ => '0',
        })
        .collect()
}

fn run_sampler_pub(
    pub_: &SamplerPub,
    options: &SamplerOptions,
    rng: &mut StdRng,
) -> HalResult<SamplerPubResult> {
    let shots = pub_.shots.unwrap_or(options.default_shots);
    let map = measurement_map(&pub_.circuit)?;
    let sv = Statevector::from_circuit(&pub_.circuit)?;

    let mut counts = Counts::new();
    for outcome in sv.sample(rng, shots) {
        counts.insert(outcome_bitstring(outcome, &map), 1);
    }
    debug!(shots, distinct = counts.len(), "sampled");
    Ok(SamplerPubResult { counts, shots })
}

#[allow(clippy::cast_precision_loss)]
fn run_estimator_pub(pub_: &EstimatorPub, options: &EstimatorOptions) -> HalResult<EstimatorPubResult> {
    let sv = Statevector::from_circuit(&pub_.circuit)?;
    let shots = f64::from(options.default_shots.max(1));

    let mut evs = Vec::with_capacity(pub_.observables.len());
    let mut stds = Vec::with_capacity(pub_.observables.len());
    for obs in &pub_.observables {
        let ev = sv.expectation(obs)?;
        let scale = obs.coeff().abs();
        let std = if scale > 0.0 {
            let unit = (ev / scale).clamp(-1.0, 1.0);
            scale * ((1.0 - unit * unit) / shots).sqrt()
        } else {
            0.0
        };
        evs.push(ev);
        stds.push(std);
    }
    Ok(EstimatorPubResult { evs, stds })
}

#[async_trait]
impl QuantumService for SimulatorService {
    fn name(&self) -> &str {
        "local-simulator"
    }

    async fn backends(&self) -> HalResult<Vec<BackendDescriptor>> {
        Ok(self.devices.clone())
    }

    #[instrument(skip(self, request), fields(program = request.program_id()))]
    async fn submit(&self, backend: &str, request: PrimitiveRequest) -> HalResult<JobId> {
        request.validate()?;
        let device = self.device(backend)?;
        match &request {
            PrimitiveRequest::Estimator { pubs, .. } => pubs
                .iter()
                .try_for_each(|p| check_executable(&p.circuit, device))?,
            PrimitiveRequest::Sampler { pubs, .. } => pubs
                .iter()
                .try_for_each(|p| check_executable(&p.circuit, device))?,
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), request.program_id(), backend);
        job.transition(JobStatus::Running);
        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }
        info!(job = %job_id, backend, pubs = request.num_pubs(), "submitted job");

        let mut rng = self.rng();
        let outcome = self.execute(device, &request, &mut rng);

        self.with_job(&job_id, |sim_job| match outcome {
            Ok(result) => {
                sim_job.result = Some(result);
                sim_job.job.transition(JobStatus::Completed);
            }
            Err(e) => {
                debug!(error = %e, "simulation failed");
                sim_job.job.transition(JobStatus::Failed(e.to_string()));
            }
        })?;

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.with_job(job_id, |j| j.job.status.clone())
    }

    async fn result(&self, job_id: &JobId) -> HalResult<PrimitiveResult> {
        self.with_job(job_id, |j| match &j.job.status {
            JobStatus::Completed => j
                .result
                .clone()
                .ok_or_else(|| HalError::UnexpectedResult(format!("job {job_id} has no result"))),
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg.clone())),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            other => Err(HalError::Backend(format!("job {job_id} is {other}"))),
        })?
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.with_job(job_id, |j| j.job.transition(JobStatus::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{fake_manila, statevector_simulator};
    use qrun_hal::{BackendFilter, WaitPolicy};
    use qrun_ir::{ClbitId, Observable, QubitId};

    fn measured_bell() -> Circuit {
        let mut circuit = Circuit::bell().unwrap();
        circuit.measure_all().unwrap();
        circuit
    }

    #[test]
    fn test_outcome_bitstring_uses_clbit_order() {
        // clbit 0 <- qubit 2, clbit 1 <- qubit 0
        let map = vec![Some(2), Some(0), None];
        assert_eq!(outcome_bitstring(0b100, &map), "001");
        assert_eq!(outcome_bitstring(0b001, &map), "010");
    }

    #[test]
    fn test_weighted_observables_scale_ev_and_std() {
        let pub_ = EstimatorPub::new(
            Circuit::bell().unwrap(),
            vec![
                "ZZ".parse::<Observable>().unwrap().with_coeff(0.5),
                "XI".parse::<Observable>().unwrap().with_coeff(-2.0),
            ],
        );
        let result = run_estimator_pub(&pub_, &EstimatorOptions::default()).unwrap();
        assert!((result.evs[0] - 0.5).abs() < 1e-12);
        assert!(result.stds[0].abs() < 1e-12);
        assert!(result.evs[1].abs() < 1e-12);
        assert!((result.stds[1] - 2.0 * (1.0f64 / 5000.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mid_circuit_measurement_rejected() {
        let mut circuit = Circuit::with_size("mid", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        assert!(matches!(
            measurement_map(&circuit),
            Err(HalError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_sampler_on_simulator() {
        let service = SimulatorService::new().with_seed(11);
        let job = service
            .submit(
                "statevector_simulator",
                PrimitiveRequest::sampler(SamplerPub::new(measured_bell()).with_shots(500)),
            )
            .await
            .unwrap();
        let result = service.wait(&job, &WaitPolicy::default()).await.unwrap();
        let pubs = result.into_sampler().unwrap();
        let counts = &pubs[0].counts;
        assert_eq!(pubs[0].shots, 500);
        assert_eq!(counts.total_shots(), 500);
        assert_eq!(counts.get("00") + counts.get("11"), 500);
        assert!(counts.get("00") > 150 && counts.get("11") > 150);
    }

    #[tokio::test]
    async fn test_untranspiled_circuit_rejected_by_hardware() {
        let service = SimulatorService::new();
        let err = service
            .submit(
                "fake_manila",
                PrimitiveRequest::sampler(SamplerPub::new(measured_bell())),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(_)));
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let service = SimulatorService::with_devices(vec![fake_manila()]);
        let err = service
            .submit(
                "fake_nowhere",
                PrimitiveRequest::sampler(SamplerPub::new(measured_bell())),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn test_too_large_for_device() {
        let service = SimulatorService::with_devices(vec![statevector_simulator(1)]);
        let err = service
            .submit(
                "statevector_simulator",
                PrimitiveRequest::sampler(SamplerPub::new(measured_bell())),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::CircuitTooLarge(_)));
    }

    #[tokio::test]
    async fn test_failed_job_surfaces_on_wait() {
        let mut circuit = Circuit::with_size("reset", 1, 1);
        circuit.reset(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let service = SimulatorService::new();
        let job = service
            .submit(
                "statevector_simulator",
                PrimitiveRequest::sampler(SamplerPub::new(circuit)),
            )
            .await
            .unwrap();
        assert!(matches!(
            service.status(&job).await.unwrap(),
            JobStatus::Failed(_)
        ));
        assert!(matches!(
            service.wait(&job, &WaitPolicy::default()).await,
            Err(HalError::JobFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_least_busy_hardware() {
        let service = SimulatorService::new();
        let device = service.least_busy(&BackendFilter::hardware()).await.unwrap();
        assert_eq!(device.name, "fake_nairobi");
        let wide = service
            .least_busy(&BackendFilter::hardware().with_min_qubits(10))
            .await
            .unwrap();
        assert_eq!(wide.name, "fake_guadalupe");
    }

    #[tokio::test]
    async fn test_job_not_found() {
        let service = SimulatorService::new();
        assert!(matches!(
            service.status(&JobId::new("missing")).await,
            Err(HalError::JobNotFound(_))
        ));
    }
}
