//! Phase oracles compiled from boolean expressions.

use std::str::FromStr;

use qrun_ir::{Circuit, QubitId};
use tracing::debug;

use crate::error::{OracleError, OracleResult};
use crate::expr::BooleanExpression;
use crate::synth::mcz;

/// A circuit that flips the sign of every basis state satisfying an
/// expression, with variable `k` read from qubit `k`.
#[derive(Debug, Clone)]
pub struct PhaseOracle {
    expression: BooleanExpression,
    solutions: Vec<u64>,
    circuit: Circuit,
}

impl PhaseOracle {
    /// Synthesize the oracle by enumerating the truth table.
    ///
    /// Each satisfying assignment becomes `X` on its zero bits, a
    /// multi-controlled Z over all qubits, then the same `X` layer.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(expression: BooleanExpression) -> OracleResult<Self> {
        let n = expression.num_variables();
        let solutions = expression.satisfying_assignments();
        debug!(
            expression = %expression,
            variables = n,
            solutions = solutions.len(),
            "synthesizing phase oracle"
        );

        let mut circuit = Circuit::with_size("oracle", n as u32, 0);
        let qubits: Vec<QubitId> = (0..n as u32).map(QubitId).collect();
        for &assignment in &solutions {
            let zeros: Vec<QubitId> = qubits
                .iter()
                .copied()
                .filter(|q| (assignment >> q.0) & 1 == 0)
                .collect();
            for &q in &zeros {
                circuit.x(q)?;
            }
            mcz(&mut circuit, &qubits)?;
            for &q in &zeros {
                circuit.x(q)?;
            }
        }

        Ok(Self {
            expression,
            solutions,
            circuit,
        })
    }

    /// The source expression.
    pub fn expression(&self) -> &BooleanExpression {
        &self.expression
    }

    /// The oracle circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Number of qubits (one per variable).
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Satisfying assignments (bit `k` = qubit `k`).
    pub fn solutions(&self) -> &[u64] {
        &self.solutions
    }

    /// Check whether a measured bitstring marks a solution.
    ///
    /// `bitstring` is read with its rightmost character as qubit 0.
    pub fn is_good_state(&self, bitstring: &str) -> bool {
        let mut value = 0u64;
        for (k, c) in bitstring.chars().rev().enumerate() {
            if c == '1' {
                value |= 1 << k;
            }
        }
        self.expression.evaluate(value)
    }
}

impl FromStr for PhaseOracle {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(BooleanExpression::parse(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ones_oracle_is_single_cz() {
        let oracle: PhaseOracle = "x0 & x1".parse().unwrap();
        assert_eq!(oracle.num_qubits(), 2);
        assert_eq!(oracle.solutions(), &[0b11]);
        let names: Vec<_> = oracle.circuit().instructions().map(|i| i.name()).collect();
        assert_eq!(names, vec!["cz"]);
    }

    #[test]
    fn test_negated_literals_are_wrapped_in_x() {
        let oracle: PhaseOracle = "~x0 & ~x1".parse().unwrap();
        assert_eq!(oracle.solutions(), &[0b00]);
        let names: Vec<_> = oracle.circuit().instructions().map(|i| i.name()).collect();
        assert_eq!(names, vec!["x", "x", "cz", "x", "x"]);
    }

    #[test]
    fn test_is_good_state_reads_little_endian() {
        // x0 = 1, x1 = 0 is the bitstring "01".
        let oracle: PhaseOracle = "x0 & ~x1".parse().unwrap();
        assert!(oracle.is_good_state("01"));
        assert!(!oracle.is_good_state("10"));
    }

    #[test]
    fn test_parse_errors_propagate() {
        assert!("x0 &".parse::<PhaseOracle>().is_err());
    }
}
