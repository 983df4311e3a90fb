//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit} not found in circuit{}", format_gate_context(.gate_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Invalid DAG structure.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Measurement operands do not pair up.
    #[error("Measurement needs one classical bit per qubit: {qubits} qubits, {clbits} bits")]
    MeasureArity {
        /// Number of measured qubits.
        qubits: usize,
        /// Number of target classical bits.
        clbits: usize,
    },

    /// Invalid character in a Pauli label.
    #[error("Invalid Pauli label '{label}': unexpected character '{found}'")]
    InvalidPauliLabel {
        /// The offending label.
        label: String,
        /// The first character that is not one of I, X, Y, Z.
        found: char,
    },

    /// Observable and layout disagree on the number of qubits.
    #[error("Layout covers {layout} qubits but the observable acts on {observable}")]
    LayoutMismatch {
        /// Number of virtual qubits in the layout.
        layout: usize,
        /// Number of qubits the observable acts on.
        observable: usize,
    },

    /// A layout maps a qubit outside the physical register.
    #[error("Physical qubit {physical} is outside a register of {num_physical}")]
    PhysicalOutOfRange {
        /// The mapped physical index.
        physical: u32,
        /// Size of the physical register.
        num_physical: usize,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
