//! Grover operator and search circuit.

use std::f64::consts::PI;

use qrun_ir::{Circuit, QubitId};
use tracing::debug;

use crate::error::{OracleError, OracleResult};
use crate::oracle::PhaseOracle;
use crate::synth::mcz;

/// One Grover iteration: the phase oracle followed by the diffusion
/// `H · X · MCZ · X · H` over all qubits.
#[derive(Debug, Clone)]
pub struct GroverOperator {
    oracle: PhaseOracle,
    circuit: Circuit,
}

impl GroverOperator {
    /// Build the operator for `oracle`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(oracle: PhaseOracle) -> OracleResult<Self> {
        let n = oracle.num_qubits();
        let qubits: Vec<QubitId> = (0..n as u32).map(QubitId).collect();

        let mut circuit = Circuit::with_size("grover_op", n as u32, 0);
        circuit.compose(oracle.circuit(), &qubits)?;
        for &q in &qubits {
            circuit.h(q)?;
        }
        for &q in &qubits {
            circuit.x(q)?;
        }
        mcz(&mut circuit, &qubits)?;
        for &q in &qubits {
            circuit.x(q)?;
        }
        for &q in &qubits {
            circuit.h(q)?;
        }
        // H X MCZ X H is -(2|s><s| - I).
        circuit.set_global_phase(circuit.global_phase() + PI);

        Ok(Self { oracle, circuit })
    }

    /// The operator circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The oracle this operator was built from.
    pub fn oracle(&self) -> &PhaseOracle {
        &self.oracle
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Iteration count that maximizes the success probability.
    pub fn optimal_iterations(&self) -> OracleResult<usize> {
        let solutions = self.oracle.solutions().len();
        if solutions == 0 {
            return Err(OracleError::Unsatisfiable(
                self.oracle.expression().source().to_string(),
            ));
        }
        Ok(optimal_iterations(self.num_qubits(), solutions))
    }

    /// Uniform superposition followed by `iterations` applications of the
    /// operator.
    #[allow(clippy::cast_possible_truncation)]
    pub fn search_circuit(&self, iterations: usize) -> OracleResult<Circuit> {
        let n = self.num_qubits();
        let qubits: Vec<QubitId> = (0..n as u32).map(QubitId).collect();
        debug!(qubits = n, iterations, "building Grover search circuit");

        let mut circuit = Circuit::with_size("grover", n as u32, 0);
        for &q in &qubits {
            circuit.h(q)?;
        }
        for _ in 0..iterations {
            circuit.compose(&self.circuit, &qubits)?;
        }
        Ok(circuit)
    }
}

/// `floor(π/4 · sqrt(N/M))` for `N = 2^num_qubits` states and `M`
/// solutions, never less than one.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn optimal_iterations(num_qubits: usize, num_solutions: usize) -> usize {
    let n = (1u64 << num_qubits) as f64;
    let m = num_solutions.max(1) as f64;
    ((PI / 4.0) * (n / m).sqrt()).floor().max(1.0) as usize
}
