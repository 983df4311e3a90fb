//! OpenQASM 3 serialization for qrun circuits.
//!
//! Remote runtimes accept circuits as OpenQASM 3 source; [`emit`] turns a
//! (usually compiled) [`Circuit`](qrun_ir::Circuit) into that text.
//!
//! ```rust
//! use qrun_ir::Circuit;
//!
//! let qasm = qrun_qasm3::emit(&Circuit::bell().unwrap()).unwrap();
//! assert!(qasm.starts_with("OPENQASM 3.0;"));
//! assert!(qasm.contains("cx q[0], q[1];"));
//! ```

pub mod emitter;
pub mod error;

pub use emitter::{QUBIT_REGISTER, emit};
pub use error::{Qasm3Error, Qasm3Result};
