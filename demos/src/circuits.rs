//! Program circuits.

use qrun_ir::Circuit;
use qrun_oracle::{GroverOperator, PhaseOracle, optimal_iterations, secret_to_expression};
use tracing::debug;

use crate::error::PipelineResult;
use crate::mode::ExecutionMode;

/// `H(0); CX(0, 1)`.
pub fn bell_circuit() -> PipelineResult<Circuit> {
    Ok(Circuit::bell()?)
}

/// Conjunction that holds only for `secret`, e.g. `"10"` → `"x0 & ~x1"`.
pub fn oracle_expression(secret: &str) -> PipelineResult<String> {
    Ok(secret_to_expression(secret)?)
}

/// A Grover search circuit and how it was built.
#[derive(Debug, Clone)]
pub struct GroverProgram {
    /// Oracle expression.
    pub expression: String,
    /// Grover iterations applied.
    pub iterations: usize,
    /// The search circuit.
    pub circuit: Circuit,
}

/// Build the search circuit for `secret`.
///
/// Sampler mode ends with `measure_all`; estimator mode leaves the circuit
/// unmeasured.
pub fn grover_circuit(secret: &str, mode: ExecutionMode) -> PipelineResult<GroverProgram> {
    let expression = oracle_expression(secret)?;
    let oracle: PhaseOracle = expression.parse()?;
    let n = oracle.num_qubits();
    let grover = GroverOperator::new(oracle)?;
    let iterations = optimal_iterations(n, 1);
    debug!(%expression, qubits = n, iterations, %mode, "building Grover program");

    let mut circuit = grover.search_circuit(iterations)?;
    if mode == ExecutionMode::Sampler {
        circuit.measure_all()?;
    }
    Ok(GroverProgram {
        expression,
        iterations,
        circuit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use qrun_oracle::OracleError;

    #[test]
    fn test_bell() {
        let names: Vec<_> = bell_circuit()
            .unwrap()
            .instructions()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, ["h", "cx"]);
    }

    #[test]
    fn test_oracle_expression() {
        assert_eq!(oracle_expression("11").unwrap(), "x0 & x1");
        assert_eq!(oracle_expression("00").unwrap(), "~x0 & ~x1");
    }

    #[test]
    fn test_modes_differ_only_in_measurement() {
        let sampled = grover_circuit("101", ExecutionMode::Sampler).unwrap();
        let estimated = grover_circuit("101", ExecutionMode::Estimator).unwrap();
        assert_eq!(sampled.iterations, 2);
        assert!(sampled.circuit.has_terminal_measurement());
        assert_eq!(sampled.circuit.num_clbits(), 3);
        assert!(!estimated.circuit.instructions().any(|i| i.is_measure()));
        assert_eq!(estimated.circuit.num_clbits(), 0);
    }

    #[test]
    fn test_bad_secrets() {
        assert!(matches!(
            grover_circuit("", ExecutionMode::Sampler),
            Err(PipelineError::Oracle(OracleError::UnexpectedEof(_)))
        ));
        assert!(matches!(
            grover_circuit("12", ExecutionMode::Sampler),
            Err(PipelineError::Oracle(OracleError::InvalidSecretBit { position: 1, .. }))
        ));
    }
}
