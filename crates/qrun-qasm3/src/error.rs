//! Error types for the QASM3 emitter.

use thiserror::Error;

/// Errors that can occur while emitting a program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Qasm3Error {
    /// A gate parameter is NaN or infinite.
    #[error("Gate '{gate}' has non-finite parameter {value}")]
    NonFiniteParameter { gate: String, value: f64 },

    /// Wire indices must be `0..n` to fit a single register.
    #[error("{kind} wires are not contiguous: index {index} with {count} declared")]
    NonContiguousWires {
        kind: &'static str,
        index: u32,
        count: usize,
    },
}

/// Result type for emitting.
pub type Qasm3Result<T> = Result<T, Qasm3Error>;
