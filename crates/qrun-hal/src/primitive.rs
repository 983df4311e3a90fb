//! Primitive requests: estimator and sampler pubs with their options.
//!
//! A *pub* (primitive unified bloc) is one unit of work inside a job: a
//! circuit plus either observables (estimator) or a shot count (sampler).

use serde::{Deserialize, Serialize};

use qrun_ir::{Circuit, Observable};

use crate::error::{HalError, HalResult};

/// Estimator run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorOptions {
    /// Shots per observable when the runtime samples.
    pub default_shots: u32,
    /// Error-mitigation level passed through to the runtime.
    pub resilience_level: u8,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            default_shots: 5000,
            resilience_level: 1,
        }
    }
}

/// Sampler run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerOptions {
    /// Shots for pubs that do not set their own.
    pub default_shots: u32,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            default_shots: 1024,
        }
    }
}

/// A circuit and the observables to estimate on it.
#[derive(Debug, Clone)]
pub struct EstimatorPub {
    /// Measurement-free circuit.
    pub circuit: Circuit,
    /// Observables over the circuit's qubits.
    pub observables: Vec<Observable>,
}

impl EstimatorPub {
    /// Create a pub.
    pub fn new(circuit: Circuit, observables: Vec<Observable>) -> Self {
        Self {
            circuit,
            observables,
        }
    }

    fn validate(&self) -> HalResult<()> {
        if self.observables.is_empty() {
            return Err(HalError::InvalidCircuit(format!(
                "estimator pub for '{}' has no observables",
                self.circuit.name()
            )));
        }
        let width = self.circuit.num_qubits();
        if let Some(obs) = self.observables.iter().find(|o| o.num_qubits() != width) {
            return Err(HalError::InvalidCircuit(format!(
                "observable {obs} spans {} qubits but circuit '{}' has {width}",
                obs.num_qubits(),
                self.circuit.name()
            )));
        }
        if self.circuit.instructions().any(|i| i.is_measure()) {
            return Err(HalError::InvalidCircuit(format!(
                "estimator circuit '{}' contains measurements",
                self.circuit.name()
            )));
        }
        Ok(())
    }
}

/// A measured circuit and how many times to run it.
#[derive(Debug, Clone)]
pub struct SamplerPub {
    /// Circuit with measurements.
    pub circuit: Circuit,
    /// Shots, or `None` for the options default.
    pub shots: Option<u32>,
}

impl SamplerPub {
    /// Create a pub using the default shot count.
    pub fn new(circuit: Circuit) -> Self {
        Self {
            circuit,
            shots: None,
        }
    }

    /// Set an explicit shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }

    fn validate(&self) -> HalResult<()> {
        if self.shots == Some(0) {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if !self.circuit.instructions().any(|i| i.is_measure()) {
            return Err(HalError::InvalidCircuit(format!(
                "sampler circuit '{}' has no measurements",
                self.circuit.name()
            )));
        }
        Ok(())
    }
}

/// A job payload for a primitive.
#[derive(Debug, Clone)]
pub enum PrimitiveRequest {
    /// Estimate expectation values.
    Estimator {
        /// Work units.
        pubs: Vec<EstimatorPub>,
        /// Run options.
        options: EstimatorOptions,
    },
    /// Sample bitstrings.
    Sampler {
        /// Work units.
        pubs: Vec<SamplerPub>,
        /// Run options.
        options: SamplerOptions,
    },
}

impl PrimitiveRequest {
    /// One estimator pub with default options.
    pub fn estimator(pub_: EstimatorPub) -> Self {
        Self::Estimator {
            pubs: vec![pub_],
            options: EstimatorOptions::default(),
        }
    }

    /// One sampler pub with default options.
    pub fn sampler(pub_: SamplerPub) -> Self {
        Self::Sampler {
            pubs: vec![pub_],
            options: SamplerOptions::default(),
        }
    }

    /// Runtime program id: `estimator` or `sampler`.
    pub fn program_id(&self) -> &'static str {
        match self {
            Self::Estimator { .. } => "estimator",
            Self::Sampler { .. } => "sampler",
        }
    }

    /// Number of pubs.
    pub fn num_pubs(&self) -> usize {
        match self {
            Self::Estimator { pubs, .. } => pubs.len(),
            Self::Sampler { pubs, .. } => pubs.len(),
        }
    }

    /// Widest circuit in the request.
    pub fn max_qubits(&self) -> usize {
        let widths: Box<dyn Iterator<Item = usize> + '_> = match self {
            Self::Estimator { pubs, .. } => Box::new(pubs.iter().map(|p| p.circuit.num_qubits())),
            Self::Sampler { pubs, .. } => Box::new(pubs.iter().map(|p| p.circuit.num_qubits())),
        };
        widths.max().unwrap_or(0)
    }

    /// Check pub shapes before submission.
    pub fn validate(&self) -> HalResult<()> {
        if self.num_pubs() == 0 {
            return Err(HalError::InvalidCircuit("request has no pubs".into()));
        }
        match self {
            Self::Estimator { pubs, .. } => pubs.iter().try_for_each(EstimatorPub::validate),
            Self::Sampler { pubs, options } => {
                if options.default_shots == 0 {
                    return Err(HalError::InvalidShots("default_shots must be positive".into()));
                }
                pubs.iter().try_for_each(SamplerPub::validate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrun_ir::QubitId;

    #[test]
    fn test_defaults() {
        assert_eq!(EstimatorOptions::default().default_shots, 5000);
        assert_eq!(EstimatorOptions::default().resilience_level, 1);
        assert_eq!(SamplerOptions::default().default_shots, 1024);
    }

    #[test]
    fn test_estimator_validation() {
        let bell = Circuit::bell().unwrap();
        let ok = PrimitiveRequest::estimator(EstimatorPub::new(
            bell.clone(),
            vec!["ZZ".parse().unwrap(), "XX".parse().unwrap()],
        ));
        assert!(ok.validate().is_ok());
        assert_eq!(ok.program_id(), "estimator");
        assert_eq!(ok.max_qubits(), 2);

        let wrong_width =
            PrimitiveRequest::estimator(EstimatorPub::new(bell.clone(), vec!["ZZZ".parse().unwrap()]));
        assert!(matches!(wrong_width.validate(), Err(HalError::InvalidCircuit(_))));

        let empty = PrimitiveRequest::estimator(EstimatorPub::new(bell, vec![]));
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_sampler_needs_measurement() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let unmeasured = PrimitiveRequest::sampler(SamplerPub::new(circuit.clone()));
        assert!(matches!(unmeasured.validate(), Err(HalError::InvalidCircuit(_))));

        circuit.measure_all().unwrap();
        let zero = PrimitiveRequest::sampler(SamplerPub::new(circuit.clone()).with_shots(0));
        assert!(matches!(zero.validate(), Err(HalError::InvalidShots(_))));

        let ok = PrimitiveRequest::sampler(SamplerPub::new(circuit));
        assert!(ok.validate().is_ok());
    }
}
