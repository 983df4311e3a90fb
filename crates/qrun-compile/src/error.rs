//! Error types for compilation.

use qrun_ir::IrError;
use thiserror::Error;

/// Errors raised by compilation passes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A pass needs a coupling map but the target has none.
    #[error("Pass requires a coupling map but none is set")]
    MissingCouplingMap,

    /// A pass needs a layout that an earlier pass should have produced.
    #[error("Pass requires a layout but none is set")]
    MissingLayout,

    /// The circuit needs more qubits than the device has.
    #[error("Circuit requires {required} qubits but target has {available}")]
    CircuitTooLarge {
        /// Qubits used by the circuit.
        required: usize,
        /// Qubits on the device.
        available: u32,
    },

    /// No path connects two physical qubits.
    #[error("Cannot route between physical qubits {qubit1} and {qubit2}")]
    RoutingFailed {
        /// First physical qubit.
        qubit1: u32,
        /// Second physical qubit.
        qubit2: u32,
    },

    /// A gate has no decomposition into the target basis.
    #[error("Gate '{0}' cannot be expressed in the target basis")]
    GateNotInBasis(String),

    /// IR error while rebuilding a circuit.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
